// src/types/bytes.rs

use base64::{engine::general_purpose, Engine as _};
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::expect_type_tag;

/// Raw binary data stored inline in an object, sent as `{"__type": "Bytes", "base64": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParseBytes(pub Vec<u8>);

impl ParseBytes {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        ParseBytes(data.into())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for ParseBytes {
    fn from(data: Vec<u8>) -> Self {
        ParseBytes(data)
    }
}

#[derive(Serialize, Deserialize)]
struct BytesWire {
    #[serde(rename = "__type")]
    kind: String,
    base64: String,
}

pub(crate) fn serialize_slice<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    BytesWire {
        kind: "Bytes".to_string(),
        base64: general_purpose::STANDARD.encode(data),
    }
    .serialize(serializer)
}

pub(crate) fn deserialize_vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let wire = BytesWire::deserialize(deserializer)?;
    expect_type_tag::<D::Error>(&wire.kind, "Bytes")?;
    general_purpose::STANDARD
        .decode(wire.base64.as_bytes())
        .map_err(|e| D::Error::custom(format!("Invalid Base64: {e}")))
}

impl Serialize for ParseBytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_slice(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for ParseBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_vec(deserializer).map(ParseBytes)
    }
}
