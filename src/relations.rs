// src/relations.rs

use crate::client::AuthType;
use crate::endpoint::Endpoint;
use crate::error::ParseError;
use crate::object::{validate_class_name, validate_object_id, UpdateObjectResponse};
use crate::types::{FieldOp, ParseDate, Pointer};

use reqwest::Method;
use serde_json::{Map, Value};

fn relation_update(
    relation_key: &str,
    targets: &[Pointer],
    op: fn(Vec<Pointer>) -> FieldOp,
) -> Result<Map<String, Value>, ParseError> {
    if relation_key.trim().is_empty() {
        return Err(ParseError::InvalidInput(
            "relation_key cannot be empty.".to_string(),
        ));
    }
    let first = targets.first().ok_or_else(|| {
        ParseError::InvalidInput("targets cannot be empty for a relation operation.".to_string())
    })?;
    for target in targets {
        if target.class_name != first.class_name {
            return Err(ParseError::InvalidInput(format!(
                "All relation targets must belong to one class, got '{}' and '{}'.",
                first.class_name, target.class_name
            )));
        }
        validate_object_id(&target.object_id)?;
    }

    let mut body = Map::new();
    body.insert(relation_key.to_string(), op(targets.to_vec()).into());
    Ok(body)
}

impl crate::Parse {
    async fn update_relation(
        &self,
        parent_class_name: &str,
        parent_object_id: &str,
        body: Map<String, Value>,
    ) -> Result<ParseDate, ParseError> {
        validate_class_name(parent_class_name)?;
        validate_object_id(parent_object_id)?;
        let response: UpdateObjectResponse = self
            ._request(
                Method::PUT,
                Endpoint::Object(parent_class_name, parent_object_id),
                &[],
                Some(&body),
                AuthType::Default,
            )
            .await?;
        Ok(response.updated_at)
    }

    /// Adds target objects to a relation field of a parent object.
    ///
    /// # Arguments
    /// * `parent_class_name`: The class name of the parent object.
    /// * `parent_object_id`: The object ID of the parent object.
    /// * `relation_key`: The key (field name) of the relation on the parent object.
    /// * `targets`: Pointers to the objects to add; all of one class.
    ///
    /// # Returns
    /// The parent's new `updatedAt`.
    pub async fn add_to_relation(
        &self,
        parent_class_name: &str,
        parent_object_id: &str,
        relation_key: &str,
        targets: &[Pointer],
    ) -> Result<ParseDate, ParseError> {
        let body = relation_update(relation_key, targets, |objects| FieldOp::AddRelation {
            objects,
        })?;
        self.update_relation(parent_class_name, parent_object_id, body)
            .await
    }

    /// Removes target objects from a relation field of a parent object.
    ///
    /// Same arguments and result as [`add_to_relation`](Self::add_to_relation).
    pub async fn remove_from_relation(
        &self,
        parent_class_name: &str,
        parent_object_id: &str,
        relation_key: &str,
        targets: &[Pointer],
    ) -> Result<ParseDate, ParseError> {
        let body = relation_update(relation_key, targets, |objects| {
            FieldOp::RemoveRelation { objects }
        })?;
        self.update_relation(parent_class_name, parent_object_id, body)
            .await
    }
}
