// src/requests.rs

use crate::client::AuthType;
use crate::endpoint::Endpoint;
use crate::error::ParseError;

use reqwest::{Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

const ERROR_SNIPPET_LEN: usize = 200;

const REDACTED: &str = "<redacted>";
const SECRET_FIELDS: [&str; 2] = ["password", "sessionToken"];

fn is_secret_field(name: &str) -> bool {
    SECRET_FIELDS.contains(&name)
}

fn redact_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if is_secret_field(key) {
                    *field = Value::String(REDACTED.to_string());
                } else {
                    redact_secrets(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_secrets),
        _ => {}
    }
}

/// `url` with the values of secret query parameters (the login password) masked.
pub(crate) fn loggable_url(url: &Url) -> String {
    if !url.query_pairs().any(|(key, _)| is_secret_field(&key)) {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if is_secret_field(&key) {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    let mut masked = url.clone();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

/// A request or response body as it may appear in logs and error messages: JSON bodies have
/// passwords and session tokens masked at any depth, anything else is shown as lossy UTF-8.
pub(crate) fn loggable_body(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(mut value) => {
            redact_secrets(&mut value);
            value.to_string()
        }
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Turns a raw HTTP response into either the expected payload or a [`ParseError`].
///
/// * 2xx with a body: the body is deserialized into `R`.
/// * 2xx without a body (e.g. 204): read as `{}`, falling back to `null` so `R = ()` works.
/// * anything else: the Parse error body `{"code": .., "error": ..}` becomes
///   [`ParseError::Api`]; a non-JSON body is summarized from the status line.
pub(crate) fn decode_response<R: DeserializeOwned>(
    status: StatusCode,
    url: &str,
    body: &[u8],
) -> Result<R, ParseError> {
    if status.is_success() {
        if body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_str("{}")
                .or_else(|_| serde_json::from_str("null"))
                .map_err(ParseError::JsonError);
        }
        serde_json::from_slice::<R>(body).map_err(|e| {
            let text = loggable_body(body);
            log::error!(
                "JSON deserialization failed for successful response from '{}'. Status: {}. Error: {}. Body: {}",
                url,
                status,
                e,
                text
            );
            ParseError::JsonDeserializationFailed(format!(
                "Failed to deserialize successful response from '{}': {}. Body: {}",
                url, e, text
            ))
        })
    } else {
        log::warn!(
            "Request to '{}' failed with status {}. Response body: {}",
            url,
            status,
            loggable_body(body)
        );
        let text = String::from_utf8_lossy(body);
        let parsed = serde_json::from_slice::<Value>(body)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| {
                let snippet: String = text.chars().take(ERROR_SNIPPET_LEN).collect();
                let reason = status.canonical_reason().unwrap_or("Unknown status");
                if snippet.trim().is_empty() {
                    json!({ "error": format!("HTTP {} {}", status.as_u16(), reason) })
                } else {
                    json!({ "error": format!("HTTP {} {}: {}", status.as_u16(), reason, snippet.trim()) })
                }
            });
        Err(ParseError::from_response(status.as_u16(), &parsed))
    }
}

// Untyped access to any endpoint with the client's default credentials.
impl crate::Parse {
    pub async fn get<R: DeserializeOwned>(&self, endpoint: Endpoint<'_>) -> Result<R, ParseError> {
        self._request(Method::GET, endpoint, &[], None::<&Value>, AuthType::Default)
            .await
    }

    pub async fn post<T: Serialize + Send + Sync + ?Sized, R: DeserializeOwned>(
        &self,
        endpoint: Endpoint<'_>,
        data: &T,
    ) -> Result<R, ParseError> {
        self._request(Method::POST, endpoint, &[], Some(data), AuthType::Default)
            .await
    }

    pub async fn put<T: Serialize + Send + Sync + ?Sized, R: DeserializeOwned>(
        &self,
        endpoint: Endpoint<'_>,
        data: &T,
    ) -> Result<R, ParseError> {
        self._request(Method::PUT, endpoint, &[], Some(data), AuthType::Default)
            .await
    }

    pub async fn delete<R: DeserializeOwned>(&self, endpoint: Endpoint<'_>) -> Result<R, ParseError> {
        self._request(Method::DELETE, endpoint, &[], None::<&Value>, AuthType::Default)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde::Deserialize;

    const URL: &str = "http://localhost/parse/classes/Thing";

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Created {
        object_id: String,
    }

    #[test]
    fn success_body_is_decoded() {
        let created: Created =
            decode_response(StatusCode::CREATED, URL, br#"{"objectId":"a1","createdAt":"x"}"#)
                .unwrap();
        assert_eq!(created.object_id, "a1");
    }

    #[test]
    fn empty_success_body_reads_as_empty_object_or_unit() {
        let value: Value = decode_response(StatusCode::NO_CONTENT, URL, b"").unwrap();
        assert_eq!(value, json!({}));
        let _: () = decode_response(StatusCode::OK, URL, b"  ").unwrap();
    }

    #[test]
    fn mismatched_success_body_is_a_deserialization_error() {
        let err = decode_response::<Created>(StatusCode::OK, URL, br#"{"results":[]}"#).unwrap_err();
        match err {
            ParseError::JsonDeserializationFailed(msg) => assert!(msg.contains(URL)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn parse_error_body_becomes_api_error() {
        let err = decode_response::<Value>(
            StatusCode::BAD_REQUEST,
            URL,
            br#"{"code":105,"error":"invalid field name: bl!ng"}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidKeyName));
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("invalid field name: bl!ng"));
    }

    #[test]
    fn non_json_error_body_uses_status_line() {
        let err = decode_response::<Value>(
            StatusCode::BAD_GATEWAY,
            URL,
            b"<html>upstream unavailable</html>",
        )
        .unwrap_err();
        match err {
            ParseError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 502);
                assert_eq!(code, ErrorCode::OtherCause);
                assert_eq!(message, "HTTP 502 Bad Gateway: <html>upstream unavailable</html>");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = decode_response::<Value>(StatusCode::UNAUTHORIZED, URL, b"").unwrap_err();
        assert!(err.to_string().ends_with("HTTP 401 Unauthorized"));
    }

    #[test]
    fn secrets_are_masked_for_logging() {
        let body = loggable_body(
            br#"{"username":"bob","password":"hunter2","nested":[{"sessionToken":"r:abc"}]}"#,
        );
        assert!(!body.contains("hunter2"));
        assert!(!body.contains("r:abc"));
        assert!(body.contains(r#""username":"bob""#));
        assert!(body.contains(REDACTED));

        assert_eq!(loggable_body(b"not json"), "not json");

        let url = Url::parse("http://localhost/parse/login?username=bob&password=hunter2").unwrap();
        let logged = loggable_url(&url);
        assert!(!logged.contains("hunter2"));
        assert!(logged.contains("username=bob"));

        let plain = Url::parse("http://localhost/parse/classes/Thing?limit=5").unwrap();
        assert_eq!(loggable_url(&plain), plain.as_str());
    }

    #[test]
    fn deserialization_error_masks_session_token() {
        let err = decode_response::<Created>(
            StatusCode::OK,
            URL,
            br#"{"username":"bob","sessionToken":"r:secret"}"#,
        )
        .unwrap_err();
        assert!(!err.to_string().contains("r:secret"));
    }
}
