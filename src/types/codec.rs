// src/types/codec.rs

//! `#[serde(with = "...")]` adapters that give plain Rust fields the Parse wire encoding.
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Match {
//!     #[serde(with = "parse_rest::types::codec::date")]
//!     kickoff: DateTime<Utc>,
//!     #[serde(with = "parse_rest::types::codec::optional_date", default)]
//!     finished: Option<DateTime<Utc>>,
//!     #[serde(with = "parse_rest::types::codec::bytes")]
//!     replay: Vec<u8>,
//! }
//! ```

/// `DateTime<Utc>` as `{"__type": "Date", "iso": ...}`.
pub mod date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::types::ParseDate;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        ParseDate::from(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        ParseDate::deserialize(deserializer).map(ParseDate::into_inner)
    }
}

/// `Option<DateTime<Utc>>`; `None` is written as `null`. Pair with `#[serde(default)]`.
pub mod optional_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::types::ParseDate;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        (*value).map(ParseDate::from).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<ParseDate>::deserialize(deserializer)?.map(ParseDate::into_inner))
    }
}

/// `Vec<u8>` as `{"__type": "Bytes", "base64": ...}`.
pub mod bytes {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        crate::types::bytes::serialize_slice(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        crate::types::bytes::deserialize_vec(deserializer)
    }
}
