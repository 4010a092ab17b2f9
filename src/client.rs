// src/client.rs

use crate::cloud::ParseCloud;
use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::ParseError;
use crate::requests::{decode_response, loggable_body, loggable_url};
use crate::user::ParseUserHandle;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) const HEADER_APPLICATION_ID: &str = "X-Parse-Application-Id";
pub(crate) const HEADER_REST_API_KEY: &str = "X-Parse-REST-API-Key";
pub(crate) const HEADER_JAVASCRIPT_KEY: &str = "X-Parse-Javascript-Key";
pub(crate) const HEADER_MASTER_KEY: &str = "X-Parse-Master-Key";
pub(crate) const HEADER_SESSION_TOKEN: &str = "X-Parse-Session-Token";

/// Which credentials a single request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType<'a> {
    /// The client's API key (REST key, else JavaScript key, else master key) plus the current
    /// session token when one is set.
    Default,
    /// The master key only. Fails with [`ParseError::MasterKeyRequired`] when none is configured.
    MasterKey,
    /// The client's API key plus an explicit session token, ignoring the stored one.
    Session(&'a str),
}

/// Request payloads the client knows how to send.
pub(crate) enum RequestBody<'a> {
    Empty,
    Json(String),
    Raw { data: Vec<u8>, content_type: &'a str },
}

/// The main client for interacting with the Parse REST API.
///
/// `Parse` holds the server URL, the application id and API keys, and the session token of
/// the logged-in user, if any. Every operation issues exactly one HTTP request through the
/// shared `reqwest::Client`.
///
/// ```rust,no_run
/// use parse_rest::{Parse, ParseError};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), ParseError> {
/// let client = Parse::new(
///     "https://api.parse.com/1",
///     "myAppId",
///     None,              // javascript_key
///     Some("myRestKey"), // rest_api_key
///     None,              // master_key
/// )?;
/// let created = client
///     .create_object("GameScore", &serde_json::json!({"score": 1337}))
///     .await?;
/// println!("created {}", created.object_id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Parse {
    base_url: Url,
    pub(crate) app_id: String,
    pub(crate) javascript_key: Option<String>,
    pub(crate) rest_api_key: Option<String>,
    pub(crate) master_key: Option<String>,
    pub(crate) http_client: Client,
    pub(crate) session_token: Option<String>,
    pub(crate) current_user_id: Option<String>,
}

impl Parse {
    /// Creates a client from positional credentials.
    ///
    /// `server_url` is the API root every endpoint is appended to, e.g. `https://api.parse.com/1`
    /// or `http://localhost:1337/parse`. A missing scheme defaults to `http://`.
    pub fn new(
        server_url: &str,
        app_id: &str,
        javascript_key: Option<&str>,
        rest_api_key: Option<&str>,
        master_key: Option<&str>,
    ) -> Result<Self, ParseError> {
        let mut config = ClientConfig::new(server_url, app_id);
        config.javascript_key = javascript_key.map(str::to_string);
        config.rest_api_key = rest_api_key.map(str::to_string);
        config.master_key = master_key.map(str::to_string);
        Self::from_config(config)
    }

    /// Creates a client from a [`ClientConfig`].
    pub fn from_config(config: ClientConfig) -> Result<Self, ParseError> {
        if config.app_id.is_empty() {
            return Err(ParseError::InvalidInput(
                "Application id cannot be empty".to_string(),
            ));
        }

        let mut url_string = config.server_url.trim().trim_end_matches('/').to_string();
        if !url_string.starts_with("http://") && !url_string.starts_with("https://") {
            url_string = format!("http://{}", url_string);
        }
        let base_url = Url::parse(&url_string)?;
        if base_url.cannot_be_a_base() {
            return Err(ParseError::InvalidInput(format!(
                "The server_url '{}' cannot be used as a base URL",
                config.server_url
            )));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            HEADER_APPLICATION_ID,
            HeaderValue::from_str(&config.app_id)?,
        );

        let mut builder = Client::builder()
            .default_headers(default_headers)
            .user_agent(concat!("parse-rest/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        log::debug!("Parse client initialized with base URL: {}", base_url);

        Ok(Self {
            base_url,
            app_id: config.app_id,
            javascript_key: config.javascript_key,
            rest_api_key: config.rest_api_key,
            master_key: config.master_key,
            http_client,
            session_token: None,
            current_user_id: None,
        })
    }

    /// Creates a client from `PARSE_*` environment variables, see [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, ParseError> {
        Self::from_config(ClientConfig::from_env()?)
    }

    pub fn server_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn has_master_key(&self) -> bool {
        self.master_key.is_some()
    }

    /// Returns the current session token, if one is set on the client.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Replaces the stored session token. Nothing is validated; see
    /// [`ParseUserHandle::become_user`] for a checked variant.
    pub fn set_session_token(&mut self, token: Option<String>) {
        if token != self.session_token {
            self.current_user_id = None;
        }
        self.session_token = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_token.is_some()
    }

    /// Returns a [`ParseUserHandle`] for signup, login and the other user operations.
    ///
    /// The handle borrows the client mutably because logging in or out changes the stored
    /// session token.
    pub fn user(&mut self) -> ParseUserHandle<'_> {
        ParseUserHandle::new(self)
    }

    /// Returns a [`ParseCloud`] handle for calling Cloud Code functions and jobs.
    pub fn cloud(&self) -> ParseCloud<'_> {
        ParseCloud::new(self)
    }

    pub(crate) fn endpoint_url(
        &self,
        endpoint: Endpoint<'_>,
        params: &[(&str, String)],
    ) -> Result<Url, ParseError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ParseError::InvalidInput(format!(
                    "The server URL '{}' cannot carry path segments",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(endpoint.segments());
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn api_key_header(&self) -> Option<(&'static str, &str)> {
        if let Some(key) = &self.rest_api_key {
            Some((HEADER_REST_API_KEY, key))
        } else if let Some(key) = &self.javascript_key {
            Some((HEADER_JAVASCRIPT_KEY, key))
        } else {
            self.master_key
                .as_deref()
                .map(|key| (HEADER_MASTER_KEY, key))
        }
    }

    pub(crate) fn auth_headers(&self, auth: AuthType<'_>) -> Result<HeaderMap, ParseError> {
        let mut headers = HeaderMap::new();
        let mut insert = |name: &'static str, value: &str| -> Result<(), ParseError> {
            headers.insert(name, HeaderValue::from_str(value)?);
            Ok(())
        };

        match auth {
            AuthType::MasterKey => match &self.master_key {
                Some(master_key) => insert(HEADER_MASTER_KEY, master_key)?,
                None => {
                    log::warn!("Master key requested for operation but not configured.");
                    return Err(ParseError::MasterKeyRequired(
                        "Master key is required for this operation but not configured on the client."
                            .to_string(),
                    ));
                }
            },
            AuthType::Default | AuthType::Session(_) => {
                match self.api_key_header() {
                    Some((name, key)) => insert(name, key)?,
                    None => log::warn!(
                        "No REST API, JavaScript or master key configured; sending the application id only."
                    ),
                }
                let token = match auth {
                    AuthType::Session(token) => Some(token),
                    _ => self.session_token.as_deref(),
                };
                if let Some(token) = token {
                    insert(HEADER_SESSION_TOKEN, token)?;
                }
            }
        }
        Ok(headers)
    }

    /// Sends a JSON request and decodes the JSON response.
    pub(crate) async fn _request<T, R>(
        &self,
        method: Method,
        endpoint: Endpoint<'_>,
        params: &[(&str, String)],
        body: Option<&T>,
        auth: AuthType<'_>,
    ) -> Result<R, ParseError>
    where
        T: Serialize + Send + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let body = match body {
            Some(data) => RequestBody::Json(serde_json::to_string(data)?),
            None => RequestBody::Empty,
        };
        self._send(method, endpoint, params, body, auth).await
    }

    pub(crate) async fn _send<R: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: Endpoint<'_>,
        params: &[(&str, String)],
        body: RequestBody<'_>,
        auth: AuthType<'_>,
    ) -> Result<R, ParseError> {
        let url = self.endpoint_url(endpoint, params)?;
        let mut headers = self.auth_headers(auth)?;
        let logged_url = loggable_url(&url);

        log::debug!(
            "Preparing request: Method={}, Endpoint={}, URL={}, Auth={}",
            method,
            endpoint,
            logged_url,
            match auth {
                AuthType::Default => "default",
                AuthType::MasterKey => "master key",
                AuthType::Session(_) => "explicit session",
            }
        );
        if log::log_enabled!(log::Level::Debug) {
            let names: Vec<&str> = headers.keys().map(HeaderName::as_str).collect();
            log::debug!("Auth headers: {:?}", names);
        }

        let mut request_builder = self.http_client.request(method, url);
        match body {
            RequestBody::Empty => log::debug!("Request body: None"),
            RequestBody::Json(json) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                log::debug!("Request body: {}", loggable_body(json.as_bytes()));
                request_builder = request_builder.body(json);
            }
            RequestBody::Raw { data, content_type } => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type)?);
                log::debug!("Request body: <binary data of size {}>", data.len());
                request_builder = request_builder.body(data);
            }
        }

        let response = request_builder.headers(headers).send().await?;
        let status = response.status();
        let body_bytes = response.bytes().await?;
        log::debug!("Response status: {}", status);

        decode_response(status, &logged_url, &body_bytes)
    }
}

impl std::fmt::Debug for Parse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parse")
            .field("server_url", &self.base_url.as_str())
            .field("app_id", &self.app_id)
            .field("has_rest_api_key", &self.rest_api_key.is_some())
            .field("has_javascript_key", &self.javascript_key.is_some())
            .field("has_master_key", &self.master_key.is_some())
            .field("is_authenticated", &self.session_token.is_some())
            .finish()
    }
}
