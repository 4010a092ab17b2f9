// src/object.rs

use crate::acl::ParseACL;
use crate::client::{AuthType, Parse};
use crate::endpoint::Endpoint;
use crate::types::{FieldOp, ParseDate, Pointer};
use crate::ParseError;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};

/// A Rust type stored in a Parse class.
///
/// The struct holds only the custom columns. Use `#[serde(rename = ...)]` to match column
/// names, and the [`codec`](crate::types::codec) adapters, [`Pointer`],
/// [`ParseRelation`](crate::types::ParseRelation) or [`ParseBytes`](crate::types::ParseBytes)
/// for the tagged Parse types.
///
/// ```rust
/// use parse_rest::{ParseClass, Pointer};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct GameScore {
///     score: i64,
///     #[serde(rename = "playerName")]
///     player_name: String,
///     player: Option<Pointer>,
/// }
///
/// impl ParseClass for GameScore {
///     const CLASS_NAME: &'static str = "GameScore";
/// }
/// ```
pub trait ParseClass: Serialize + DeserializeOwned + Send + Sync {
    const CLASS_NAME: &'static str;
}

/// An object as read back from the server: the built-in columns plus the typed payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRecord<T> {
    pub object_id: String,
    pub created_at: ParseDate,
    #[serde(default)]
    pub updated_at: Option<ParseDate>,
    #[serde(rename = "ACL", default)]
    pub acl: Option<ParseACL>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ParseRecord<T> {
    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T: ParseClass> ParseRecord<T> {
    pub fn pointer(&self) -> Pointer {
        Pointer::to::<T>(self.object_id.clone())
    }
}

impl<T> Deref for ParseRecord<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for ParseRecord<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

/// An object of any class with its custom columns kept as raw JSON.
pub type RetrievedParseObject = ParseRecord<Map<String, Value>>;

/// A schemaless object for classes without a Rust type.
///
/// Only the custom fields and the ACL are sent on save; the object id and timestamps are
/// read-only and filled in from server responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseObject {
    #[serde(rename = "objectId", skip_serializing, default)]
    pub object_id: Option<String>,
    #[serde(rename = "createdAt", skip_serializing, default)]
    pub created_at: Option<ParseDate>,
    #[serde(rename = "updatedAt", skip_serializing, default)]
    pub updated_at: Option<ParseDate>,
    #[serde(rename = "ACL", skip_serializing_if = "Option::is_none", default)]
    pub acl: Option<ParseACL>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    // Context only; never part of the payload.
    #[serde(skip)]
    pub class_name: String,
}

impl ParseObject {
    pub fn new(class_name: &str) -> Self {
        ParseObject {
            class_name: class_name.to_string(),
            fields: Map::new(),
            acl: None,
            object_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Reference to an already stored object; saving it updates only the fields set afterwards.
    pub fn with_id(class_name: &str, object_id: &str) -> Self {
        let mut object = Self::new(class_name);
        object.object_id = Some(object_id.to_string());
        object
    }

    pub fn set<T: Serialize>(&mut self, field_name: &str, value: T) -> Result<&mut Self, ParseError> {
        let value = serde_json::to_value(value)?;
        self.fields.insert(field_name.to_string(), value);
        Ok(self)
    }

    /// Reads a field as `T`. `None` if the field is missing or has another shape.
    pub fn get<T: DeserializeOwned>(&self, field_name: &str) -> Option<T> {
        self.fields
            .get(field_name)
            .and_then(|v| T::deserialize(v).ok())
    }

    pub fn set_acl(&mut self, acl: ParseACL) -> &mut Self {
        self.acl = Some(acl);
        self
    }

    pub fn pointer(&self) -> Option<Pointer> {
        self.object_id
            .as_ref()
            .map(|id| Pointer::new(self.class_name.clone(), id.clone()))
    }

    fn apply(&mut self, field_name: &str, op: FieldOp) -> &mut Self {
        self.fields.insert(field_name.to_string(), op.into());
        self
    }

    pub fn increment(&mut self, field_name: &str, amount: i64) -> &mut Self {
        self.apply(field_name, FieldOp::Increment { amount })
    }

    pub fn decrement(&mut self, field_name: &str, amount: i64) -> &mut Self {
        self.increment(field_name, -amount)
    }

    pub fn add_to_array<T: Serialize>(
        &mut self,
        field_name: &str,
        items: &[T],
    ) -> Result<&mut Self, ParseError> {
        let objects = to_values(items)?;
        Ok(self.apply(field_name, FieldOp::Add { objects }))
    }

    pub fn add_unique_to_array<T: Serialize>(
        &mut self,
        field_name: &str,
        items: &[T],
    ) -> Result<&mut Self, ParseError> {
        let objects = to_values(items)?;
        Ok(self.apply(field_name, FieldOp::AddUnique { objects }))
    }

    pub fn remove_from_array<T: Serialize>(
        &mut self,
        field_name: &str,
        items: &[T],
    ) -> Result<&mut Self, ParseError> {
        let objects = to_values(items)?;
        Ok(self.apply(field_name, FieldOp::Remove { objects }))
    }

    /// Deletes the field from the stored object on the next save.
    pub fn unset(&mut self, field_name: &str) -> &mut Self {
        self.apply(field_name, FieldOp::Delete)
    }
}

fn to_values<T: Serialize>(items: &[T]) -> Result<Vec<Value>, ParseError> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(ParseError::from))
        .collect()
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateObjectResponse {
    pub object_id: String,
    pub created_at: ParseDate,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateObjectResponse {
    pub updated_at: ParseDate,
}

pub(crate) fn validate_class_name(class_name: &str) -> Result<(), ParseError> {
    if class_name.is_empty() {
        return Err(ParseError::InvalidInput(
            "Class name cannot be empty".to_string(),
        ));
    }
    if !class_name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    {
        return Err(ParseError::InvalidInput(format!(
            "Invalid class name '{}': must start with a letter or underscore.",
            class_name
        )));
    }
    if !class_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ParseError::InvalidInput(format!(
            "Invalid class name '{}': can only contain letters, numbers, or underscores.",
            class_name
        )));
    }
    Ok(())
}

pub(crate) fn validate_object_id(object_id: &str) -> Result<(), ParseError> {
    if object_id.trim().is_empty() {
        return Err(ParseError::InvalidInput(
            "Object ID cannot be empty".to_string(),
        ));
    }
    Ok(())
}

impl Parse {
    /// Creates an object in `class_name`. `POST classes/<class_name>`.
    pub async fn create_object<T: Serialize + Send + Sync + ?Sized>(
        &self,
        class_name: &str,
        data: &T,
    ) -> Result<CreateObjectResponse, ParseError> {
        validate_class_name(class_name)?;
        self._request(
            Method::POST,
            Endpoint::Classes(class_name),
            &[],
            Some(data),
            AuthType::Default,
        )
        .await
    }

    /// Fetches one object. `GET classes/<class_name>/<object_id>`.
    pub async fn retrieve_object(
        &self,
        class_name: &str,
        object_id: &str,
    ) -> Result<RetrievedParseObject, ParseError> {
        validate_class_name(class_name)?;
        validate_object_id(object_id)?;
        self._request(
            Method::GET,
            Endpoint::Object(class_name, object_id),
            &[],
            None::<&Value>,
            AuthType::Default,
        )
        .await
    }

    /// Changes the given fields of an object. `PUT classes/<class_name>/<object_id>`.
    pub async fn update_object<T: Serialize + Send + Sync + ?Sized>(
        &self,
        class_name: &str,
        object_id: &str,
        data: &T,
    ) -> Result<UpdateObjectResponse, ParseError> {
        validate_class_name(class_name)?;
        validate_object_id(object_id)?;
        self._request(
            Method::PUT,
            Endpoint::Object(class_name, object_id),
            &[],
            Some(data),
            AuthType::Default,
        )
        .await
    }

    /// Deletes an object. `DELETE classes/<class_name>/<object_id>`.
    pub async fn delete_object(&self, class_name: &str, object_id: &str) -> Result<(), ParseError> {
        validate_class_name(class_name)?;
        validate_object_id(object_id)?;
        let response_value: Value = self
            ._request(
                Method::DELETE,
                Endpoint::Object(class_name, object_id),
                &[],
                None::<&Value>,
                AuthType::Default,
            )
            .await?;

        match response_value.as_object() {
            Some(obj) if obj.is_empty() => Ok(()),
            _ => Err(ParseError::UnexpectedResponse(format!(
                "Expected empty JSON object {{}} for delete, got: {}",
                response_value
            ))),
        }
    }

    /// Creates a typed object in `T::CLASS_NAME`.
    pub async fn create<T: ParseClass>(&self, data: &T) -> Result<CreateObjectResponse, ParseError> {
        self.create_object(T::CLASS_NAME, data).await
    }

    /// Fetches a typed object by id.
    pub async fn fetch<T: ParseClass>(&self, object_id: &str) -> Result<ParseRecord<T>, ParseError> {
        validate_object_id(object_id)?;
        self._request(
            Method::GET,
            Endpoint::Object(T::CLASS_NAME, object_id),
            &[],
            None::<&Value>,
            AuthType::Default,
        )
        .await
    }

    /// Sends `changes` (a full `T`, a partial struct, or `json!` with field operators) to the
    /// typed object `object_id`.
    pub async fn update<T: ParseClass, U: Serialize + Send + Sync + ?Sized>(
        &self,
        object_id: &str,
        changes: &U,
    ) -> Result<UpdateObjectResponse, ParseError> {
        self.update_object(T::CLASS_NAME, object_id, changes).await
    }

    pub async fn destroy<T: ParseClass>(&self, object_id: &str) -> Result<(), ParseError> {
        self.delete_object(T::CLASS_NAME, object_id).await
    }

    /// Creates `object` when it has no id yet, otherwise updates it.
    ///
    /// The returned id and timestamps are written back. Pending field operations
    /// (increment, array and delete operators) are dropped from `fields` after a successful
    /// save since their result only exists on the server.
    pub async fn save_object(&self, object: &mut ParseObject) -> Result<(), ParseError> {
        validate_class_name(&object.class_name)?;
        match object.object_id.clone() {
            None => {
                let created = self.create_object(&object.class_name, &*object).await?;
                object.object_id = Some(created.object_id);
                object.created_at = Some(created.created_at);
                object.updated_at = Some(created.created_at);
            }
            Some(object_id) => {
                let updated = self
                    .update_object(&object.class_name, &object_id, &*object)
                    .await?;
                object.updated_at = Some(updated.updated_at);
            }
        }
        object.fields.retain(|_, value| !FieldOp::is_op(value));
        Ok(())
    }
}
