// src/types/mod.rs

pub mod bytes;
pub mod codec;
pub mod common;
pub mod date;

pub use bytes::ParseBytes;
pub use common::{FieldOp, ParseRelation, Pointer};
pub use date::ParseDate;

use serde::de::Error;

// Every tagged wire value carries `"__type": <name>`; reject anything else early.
pub(crate) fn expect_type_tag<E: Error>(found: &str, expected: &'static str) -> Result<(), E> {
    if found == expected {
        Ok(())
    } else {
        Err(E::custom(format!(
            "expected __type \"{}\", found \"{}\"",
            expected, found
        )))
    }
}
