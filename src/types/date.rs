// src/types/date.rs

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::expect_type_tag;

/// A point in time as Parse stores it: UTC with millisecond precision.
///
/// On the wire a date field is the tagged object `{"__type": "Date", "iso": "..."}`. The
/// built-in `createdAt` / `updatedAt` columns are sent back as bare ISO strings instead, so
/// deserialization accepts both forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParseDate(DateTime<Utc>);

impl ParseDate {
    pub fn now() -> Self {
        ParseDate(Utc::now())
    }

    /// Parses an RFC 3339 / ISO 8601 timestamp such as `2011-08-21T18:02:52.249Z`.
    pub fn from_iso(iso: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(iso).map(|dt| ParseDate(dt.with_timezone(&Utc)))
    }

    /// The timestamp in the exact form Parse expects, e.g. `2011-08-21T18:02:52.249Z`.
    pub fn iso(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for ParseDate {
    fn from(dt: DateTime<Utc>) -> Self {
        ParseDate(dt)
    }
}

impl From<ParseDate> for DateTime<Utc> {
    fn from(date: ParseDate) -> Self {
        date.0
    }
}

impl std::fmt::Display for ParseDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.iso())
    }
}

#[derive(Serialize)]
struct TaggedDate<'a> {
    #[serde(rename = "__type")]
    kind: &'static str,
    iso: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateRepr {
    Bare(String),
    Tagged {
        #[serde(rename = "__type")]
        kind: String,
        iso: String,
    },
}

impl Serialize for ParseDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        TaggedDate {
            kind: "Date",
            iso: &self.iso(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParseDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let iso = match DateRepr::deserialize(deserializer)? {
            DateRepr::Bare(iso) => iso,
            DateRepr::Tagged { kind, iso } => {
                expect_type_tag::<D::Error>(&kind, "Date")?;
                iso
            }
        };
        ParseDate::from_iso(&iso)
            .map_err(|e| D::Error::custom(format!("invalid ISO date \"{}\": {}", iso, e)))
    }
}
