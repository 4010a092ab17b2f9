// src/types/common.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::object::ParseClass;

/// A reference to another Parse object.
///
/// Serialized as `{"__type": "Pointer", "className": ..., "objectId": ...}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(tag = "__type", rename = "Pointer")]
pub struct Pointer {
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(rename = "objectId")]
    pub object_id: String,
}

impl Pointer {
    pub fn new(class_name: impl Into<String>, object_id: impl Into<String>) -> Self {
        Pointer {
            class_name: class_name.into(),
            object_id: object_id.into(),
        }
    }

    /// Pointer to an object of the typed class `T`.
    pub fn to<T: ParseClass>(object_id: impl Into<String>) -> Self {
        Pointer::new(T::CLASS_NAME, object_id)
    }
}

/// Marks a field as a relation to a set of objects of `class_name`.
///
/// The members themselves are never embedded; they are managed with
/// [`FieldOp::AddRelation`] / [`FieldOp::RemoveRelation`] and read back with a
/// `$relatedTo` query.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(tag = "__type", rename = "Relation")]
pub struct ParseRelation {
    #[serde(rename = "className")]
    pub class_name: String,
}

impl ParseRelation {
    pub fn new(class_name: impl Into<String>) -> Self {
        ParseRelation {
            class_name: class_name.into(),
        }
    }

    pub fn of<T: ParseClass>() -> Self {
        ParseRelation::new(T::CLASS_NAME)
    }
}

/// Atomic field updates, sent in place of a field's value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "__op")]
pub enum FieldOp {
    Increment { amount: i64 },
    Add { objects: Vec<Value> },
    AddUnique { objects: Vec<Value> },
    Remove { objects: Vec<Value> },
    Delete,
    AddRelation { objects: Vec<Pointer> },
    RemoveRelation { objects: Vec<Pointer> },
}

impl From<FieldOp> for Value {
    fn from(op: FieldOp) -> Self {
        // String keys and JSON operands only, so serialization cannot fail.
        serde_json::to_value(op).unwrap_or(Value::Null)
    }
}

impl FieldOp {
    /// Whether `value` is a pending field operation rather than plain data.
    pub fn is_op(value: &Value) -> bool {
        value.get("__op").is_some_and(Value::is_string)
    }
}
