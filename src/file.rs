// src/file.rs

use crate::client::{AuthType, Parse, RequestBody};
use crate::endpoint::Endpoint;
use crate::error::ParseError;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A file stored on the server, as embedded in an object field:
/// `{"__type": "File", "name": .., "url": ..}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "__type", rename = "File")]
pub struct FileField {
    pub name: String,
    pub url: String,
}

impl FileField {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        FileField {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct UploadResponse {
    name: String,
    url: String,
}

fn require_file_name(name: &str) -> Result<(), ParseError> {
    if name.trim().is_empty() {
        return Err(ParseError::InvalidInput(
            "File name cannot be empty.".to_string(),
        ));
    }
    Ok(())
}

impl Parse {
    /// Uploads raw bytes as a file. `POST files/<name>`.
    ///
    /// The server usually prefixes the stored name to make it unique; the returned
    /// [`FileField`] carries that name and the public URL, ready to be set on an object.
    pub async fn upload_file(
        &self,
        file_name: &str,
        data: Vec<u8>,
        mime_type: &str,
    ) -> Result<FileField, ParseError> {
        require_file_name(file_name)?;
        if mime_type.trim().is_empty() {
            return Err(ParseError::InvalidInput(
                "MIME type cannot be empty.".to_string(),
            ));
        }
        let response: UploadResponse = self
            ._send(
                Method::POST,
                Endpoint::File(file_name),
                &[],
                RequestBody::Raw {
                    data,
                    content_type: mime_type,
                },
                AuthType::Default,
            )
            .await?;
        Ok(FileField::new(response.name, response.url))
    }

    /// Deletes a stored file by the name the server returned on upload. `DELETE files/<name>`
    /// with the master key.
    pub async fn delete_file(&self, file_name: &str) -> Result<(), ParseError> {
        require_file_name(file_name)?;
        let _: Value = self
            ._request(
                Method::DELETE,
                Endpoint::File(file_name),
                &[],
                None::<&Value>,
                AuthType::MasterKey,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_field_wire_format() {
        let field = FileField::new("abc-pic.jpg", "http://files.example.com/abc-pic.jpg");
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(
            value,
            json!({"__type": "File", "name": "abc-pic.jpg", "url": "http://files.example.com/abc-pic.jpg"})
        );
        assert_eq!(serde_json::from_value::<FileField>(value).unwrap(), field);
        assert!(serde_json::from_value::<FileField>(json!({"name": "a", "url": "b"})).is_err());
    }
}
