//! A typed client for the Parse REST API.
//!
//! Rust structs map to Parse classes through [`ParseClass`] and serde; dates, bytes, pointers
//! and relations use the tagged wire types in [`types`]. Every operation is one HTTP request on
//! a [`Parse`] client and fails with a [`ParseError`].

pub mod acl;
pub mod analytics;
pub mod client;
pub mod cloud;
pub mod config;
pub mod constraint;
pub mod endpoint;
pub mod error;
pub mod file;
pub mod geopoint;
pub mod object;
pub mod query;
pub mod relations;
pub mod requests;
pub mod types;
pub mod user;

pub use acl::ParseACL;
pub use client::{AuthType, Parse};
pub use cloud::ParseCloud;
pub use config::ClientConfig;
pub use constraint::Constraint;
pub use endpoint::Endpoint;
pub use error::{ErrorCode, ParseError};
pub use file::FileField;
pub use geopoint::ParseGeoPoint;
pub use object::{ParseClass, ParseObject, ParseRecord, RetrievedParseObject};
pub use query::ParseQuery;
pub use user::{ParseUser, ParseUserHandle};

pub use types::{FieldOp, ParseBytes, ParseDate, ParseRelation, Pointer};
