// src/error.rs

use reqwest::header::InvalidHeaderValue;
use serde_json::Value;
use thiserror::Error;

/// Error codes documented by the Parse REST API.
///
/// The server reports these in the `code` field of an error body. Codes this crate has no
/// dedicated variant for are kept as [`ErrorCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    OtherCause,
    InternalServerError,
    ConnectionFailed,
    ObjectNotFound,
    InvalidQuery,
    InvalidClassName,
    MissingObjectId,
    InvalidKeyName,
    InvalidPointer,
    InvalidJson,
    IncorrectType,
    ObjectTooLarge,
    OperationForbidden,
    InvalidFileName,
    InvalidAcl,
    Timeout,
    InvalidEmailAddress,
    DuplicateValue,
    ScriptFailed,
    ValidationFailed,
    RequestLimitExceeded,
    InvalidEventName,
    UsernameMissing,
    PasswordMissing,
    UsernameTaken,
    EmailTaken,
    EmailMissing,
    EmailNotFound,
    SessionMissing,
    InvalidSessionToken,
    Other(i32),
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -1 => ErrorCode::OtherCause,
            1 => ErrorCode::InternalServerError,
            100 => ErrorCode::ConnectionFailed,
            101 => ErrorCode::ObjectNotFound,
            102 => ErrorCode::InvalidQuery,
            103 => ErrorCode::InvalidClassName,
            104 => ErrorCode::MissingObjectId,
            105 => ErrorCode::InvalidKeyName,
            106 => ErrorCode::InvalidPointer,
            107 => ErrorCode::InvalidJson,
            111 => ErrorCode::IncorrectType,
            116 => ErrorCode::ObjectTooLarge,
            119 => ErrorCode::OperationForbidden,
            122 => ErrorCode::InvalidFileName,
            123 => ErrorCode::InvalidAcl,
            124 => ErrorCode::Timeout,
            125 => ErrorCode::InvalidEmailAddress,
            137 => ErrorCode::DuplicateValue,
            141 => ErrorCode::ScriptFailed,
            142 => ErrorCode::ValidationFailed,
            155 => ErrorCode::RequestLimitExceeded,
            160 => ErrorCode::InvalidEventName,
            200 => ErrorCode::UsernameMissing,
            201 => ErrorCode::PasswordMissing,
            202 => ErrorCode::UsernameTaken,
            203 => ErrorCode::EmailTaken,
            204 => ErrorCode::EmailMissing,
            205 => ErrorCode::EmailNotFound,
            206 => ErrorCode::SessionMissing,
            209 => ErrorCode::InvalidSessionToken,
            other => ErrorCode::Other(other),
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::OtherCause => -1,
            ErrorCode::InternalServerError => 1,
            ErrorCode::ConnectionFailed => 100,
            ErrorCode::ObjectNotFound => 101,
            ErrorCode::InvalidQuery => 102,
            ErrorCode::InvalidClassName => 103,
            ErrorCode::MissingObjectId => 104,
            ErrorCode::InvalidKeyName => 105,
            ErrorCode::InvalidPointer => 106,
            ErrorCode::InvalidJson => 107,
            ErrorCode::IncorrectType => 111,
            ErrorCode::ObjectTooLarge => 116,
            ErrorCode::OperationForbidden => 119,
            ErrorCode::InvalidFileName => 122,
            ErrorCode::InvalidAcl => 123,
            ErrorCode::Timeout => 124,
            ErrorCode::InvalidEmailAddress => 125,
            ErrorCode::DuplicateValue => 137,
            ErrorCode::ScriptFailed => 141,
            ErrorCode::ValidationFailed => 142,
            ErrorCode::RequestLimitExceeded => 155,
            ErrorCode::InvalidEventName => 160,
            ErrorCode::UsernameMissing => 200,
            ErrorCode::PasswordMissing => 201,
            ErrorCode::UsernameTaken => 202,
            ErrorCode::EmailTaken => 203,
            ErrorCode::EmailMissing => 204,
            ErrorCode::EmailNotFound => 205,
            ErrorCode::SessionMissing => 206,
            ErrorCode::InvalidSessionToken => 209,
            ErrorCode::Other(code) => code,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", i32::from(*self))
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("HTTP request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("URL parsing failed: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON processing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),

    #[error("JSON deserialization failed: {0}")]
    JsonDeserializationFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Master key required: {0}")]
    MasterKeyRequired(String),

    #[error("Session token is missing")]
    SessionTokenMissing,

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Parse API error (HTTP {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: ErrorCode,
        message: String,
    },
}

impl ParseError {
    /// Builds an [`ParseError::Api`] from a non-2xx status and the JSON error body.
    ///
    /// Parse error bodies look like `{"code": 101, "error": "Object not found."}`. A body without
    /// a `code` is reported as [`ErrorCode::OtherCause`].
    pub(crate) fn from_response(status_code: u16, response_body: &Value) -> Self {
        let code = response_body
            .get("code")
            .and_then(Value::as_i64)
            .and_then(|c| i32::try_from(c).ok())
            .map(ErrorCode::from)
            .unwrap_or(ErrorCode::OtherCause);
        let message = response_body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error {}", status_code));

        ParseError::Api {
            status: status_code,
            code,
            message,
        }
    }

    /// The Parse error code, when the error came back from the server.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ParseError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// HTTP status of a server-side failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ParseError::Api { status, .. } => Some(*status),
            ParseError::ReqwestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ParseError::Api {
                code: ErrorCode::ObjectNotFound,
                ..
            } | ParseError::Api { status: 404, .. }
        )
    }

    pub fn is_invalid_session(&self) -> bool {
        matches!(
            self,
            ParseError::Api {
                code: ErrorCode::InvalidSessionToken,
                ..
            }
        )
    }
}
