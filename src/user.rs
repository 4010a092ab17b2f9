// src/user.rs

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::acl::ParseACL;
use crate::client::{AuthType, Parse};
use crate::endpoint::Endpoint;
use crate::error::ParseError;
use crate::object::{ParseClass, UpdateObjectResponse};
use crate::types::ParseDate;

pub const USER_CLASS_NAME: &str = "_User";

/// A Parse user as returned by signup, login and `users/me`.
///
/// The password is write-only and never part of this struct. Custom columns of the `_User`
/// class end up in `other_fields`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ParseUser {
    #[serde(rename = "objectId", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "emailVerified", default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(rename = "sessionToken", default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<ParseDate>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<ParseDate>,
    #[serde(rename = "ACL", default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<ParseACL>,
    #[serde(flatten)]
    pub other_fields: Map<String, Value>,
}

impl ParseClass for ParseUser {
    const CLASS_NAME: &'static str = USER_CLASS_NAME;
}

#[derive(Debug, Deserialize, Clone)]
pub struct SignupResponse {
    #[serde(rename = "objectId")]
    pub object_id: String,
    #[serde(rename = "sessionToken")]
    pub session_token: String,
    #[serde(rename = "createdAt")]
    pub created_at: ParseDate,
}

#[derive(Serialize, Debug)]
struct PasswordResetRequest<'a> {
    email: &'a str,
}

fn require_non_empty(value: &str, what: &str) -> Result<(), ParseError> {
    if value.trim().is_empty() {
        return Err(ParseError::InvalidInput(format!("{} cannot be empty", what)));
    }
    Ok(())
}

/// User operations that read or change the client's session.
///
/// Obtained from [`Parse::user`]. Signup, login and [`become_user`](Self::become_user) store the
/// session token on the client so later requests run as that user; logout clears it.
pub struct ParseUserHandle<'a> {
    client: &'a mut Parse,
}

impl<'a> ParseUserHandle<'a> {
    pub(crate) fn new(client: &'a mut Parse) -> Self {
        ParseUserHandle { client }
    }

    fn store_session(&mut self, user: &ParseUser) {
        self.client.session_token = user.session_token.clone();
        self.client.current_user_id = user.object_id.clone();
    }

    fn clear_session(&mut self) {
        self.client.session_token = None;
        self.client.current_user_id = None;
    }

    /// Signs up a new user. `POST users`.
    ///
    /// On success the returned session token is stored on the client.
    pub async fn signup(
        &mut self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<ParseUser, ParseError> {
        self.signup_with_fields(username, password, email, &Map::new())
            .await
    }

    /// Signs up a new user with extra custom columns.
    ///
    /// `extra` must serialize to a JSON object; `username`, `password` and `email` take
    /// precedence over keys of the same name in it.
    pub async fn signup_with_fields<T: Serialize + ?Sized>(
        &mut self,
        username: &str,
        password: &str,
        email: Option<&str>,
        extra: &T,
    ) -> Result<ParseUser, ParseError> {
        require_non_empty(username, "Username")?;
        require_non_empty(password, "Password")?;

        let mut body = match serde_json::to_value(extra)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ParseError::InvalidInput(format!(
                    "Signup fields must be a JSON object, got: {}",
                    other
                )))
            }
        };
        body.insert("username".to_string(), Value::String(username.to_string()));
        body.insert("password".to_string(), Value::String(password.to_string()));
        if let Some(email) = email {
            body.insert("email".to_string(), Value::String(email.to_string()));
        }

        let response: SignupResponse = self
            .client
            ._request(
                Method::POST,
                Endpoint::Users,
                &[],
                Some(&body),
                AuthType::Default,
            )
            .await?;

        body.remove("password");
        body.remove("username");
        body.remove("email");
        let user = ParseUser {
            object_id: Some(response.object_id),
            username: username.to_string(),
            email: email.map(str::to_string),
            session_token: Some(response.session_token),
            created_at: Some(response.created_at),
            updated_at: Some(response.created_at),
            other_fields: body,
            ..Default::default()
        };
        self.store_session(&user);
        log::debug!("Signed up user '{}'", username);
        Ok(user)
    }

    /// Logs in with username and password. `GET login`.
    ///
    /// On success the session token is stored on the client.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<ParseUser, ParseError> {
        require_non_empty(username, "Username")?;
        require_non_empty(password, "Password")?;

        let params = [
            ("username", username.to_string()),
            ("password", password.to_string()),
        ];
        let user: ParseUser = self
            .client
            ._request(
                Method::GET,
                Endpoint::Login,
                &params,
                None::<&Value>,
                AuthType::Default,
            )
            .await?;
        if user.session_token.is_none() {
            return Err(ParseError::UnexpectedResponse(
                "Login response did not contain a session token".to_string(),
            ));
        }
        self.store_session(&user);
        log::debug!("Logged in user '{}'", username);
        Ok(user)
    }

    /// Validates `session_token` with `GET users/me` and makes it the client's session.
    ///
    /// The stored session is left untouched when validation fails.
    pub async fn become_user(&mut self, session_token: &str) -> Result<ParseUser, ParseError> {
        require_non_empty(session_token, "Session token")?;
        let mut user: ParseUser = self
            .client
            ._request(
                Method::GET,
                Endpoint::Me,
                &[],
                None::<&Value>,
                AuthType::Session(session_token),
            )
            .await?;
        user.session_token = Some(session_token.to_string());
        self.store_session(&user);
        Ok(user)
    }

    /// Fetches the user the client's session belongs to. `GET users/me`.
    pub async fn current(&mut self) -> Result<ParseUser, ParseError> {
        if self.client.session_token.is_none() {
            return Err(ParseError::SessionTokenMissing);
        }
        let user: ParseUser = self
            .client
            ._request(
                Method::GET,
                Endpoint::Me,
                &[],
                None::<&Value>,
                AuthType::Default,
            )
            .await?;
        self.client.current_user_id = user.object_id.clone();
        Ok(user)
    }

    /// Ends the current session. `POST logout`.
    ///
    /// The token is cleared locally even when the server answers that the session is already
    /// invalid; that error is not returned. Without a session this is a no-op.
    pub async fn logout(&mut self) -> Result<(), ParseError> {
        if self.client.session_token.is_none() {
            log::debug!("Logout requested without a session; nothing to do.");
            return Ok(());
        }
        let result: Result<Value, ParseError> = self
            .client
            ._request(
                Method::POST,
                Endpoint::Logout,
                &[],
                None::<&Value>,
                AuthType::Default,
            )
            .await;
        match result {
            Ok(_) => {
                self.clear_session();
                Ok(())
            }
            Err(e) if e.is_invalid_session() => {
                log::warn!("Session was already invalid on logout: {}", e);
                self.clear_session();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Asks the server to email a password reset link. `POST requestPasswordReset`.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ParseError> {
        require_non_empty(email, "Email")?;
        let _: Value = self
            .client
            ._request(
                Method::POST,
                Endpoint::RequestPasswordReset,
                &[],
                Some(&PasswordResetRequest { email }),
                AuthType::Default,
            )
            .await?;
        Ok(())
    }

    async fn current_user_id(&mut self) -> Result<String, ParseError> {
        if self.client.session_token.is_none() {
            return Err(ParseError::SessionTokenMissing);
        }
        if let Some(id) = &self.client.current_user_id {
            return Ok(id.clone());
        }
        // Token was set directly; resolve who it belongs to first.
        self.current().await?.object_id.ok_or_else(|| {
            ParseError::UnexpectedResponse("users/me returned no objectId".to_string())
        })
    }

    /// Updates fields of the logged-in user. `PUT users/<id>`.
    ///
    /// When the session token was set with [`Parse::set_session_token`] the user id is not
    /// known yet and one extra `GET users/me` is issued first.
    pub async fn update_current<T: Serialize + Send + Sync + ?Sized>(
        &mut self,
        data: &T,
    ) -> Result<UpdateObjectResponse, ParseError> {
        let user_id = self.current_user_id().await?;
        self.client
            ._request(
                Method::PUT,
                Endpoint::User(&user_id),
                &[],
                Some(data),
                AuthType::Default,
            )
            .await
    }

    /// Deletes the logged-in user. `DELETE users/<id>`. The session is cleared afterwards.
    pub async fn delete_current(&mut self) -> Result<(), ParseError> {
        let user_id = self.current_user_id().await?;
        let _: Value = self
            .client
            ._request(
                Method::DELETE,
                Endpoint::User(&user_id),
                &[],
                None::<&Value>,
                AuthType::Default,
            )
            .await?;
        self.clear_session();
        Ok(())
    }
}
