// src/config.rs

use std::time::Duration;

use crate::error::ParseError;

pub const ENV_SERVER_URL: &str = "PARSE_SERVER_URL";
pub const ENV_APP_ID: &str = "PARSE_APP_ID";
pub const ENV_REST_API_KEY: &str = "PARSE_REST_API_KEY";
pub const ENV_JAVASCRIPT_KEY: &str = "PARSE_JAVASCRIPT_KEY";
pub const ENV_MASTER_KEY: &str = "PARSE_MASTER_KEY";
pub const ENV_TIMEOUT_SECS: &str = "PARSE_TIMEOUT_SECS";

/// Connection settings for a [`Parse`](crate::Parse) client.
///
/// ```rust
/// use parse_rest::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("https://api.parse.com/1", "myAppId")
///     .with_rest_api_key("myRestKey")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(config.app_id, "myAppId");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to, e.g. `https://api.parse.com/1` or
    /// `http://localhost:1337/parse`.
    pub server_url: String,
    pub app_id: String,
    pub rest_api_key: Option<String>,
    pub javascript_key: Option<String>,
    pub master_key: Option<String>,
    /// Whole-request timeout. `None` keeps reqwest's default (no timeout).
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>, app_id: impl Into<String>) -> Self {
        ClientConfig {
            server_url: server_url.into(),
            app_id: app_id.into(),
            rest_api_key: None,
            javascript_key: None,
            master_key: None,
            timeout: None,
        }
    }

    pub fn with_rest_api_key(mut self, key: impl Into<String>) -> Self {
        self.rest_api_key = Some(key.into());
        self
    }

    pub fn with_javascript_key(mut self, key: impl Into<String>) -> Self {
        self.javascript_key = Some(key.into());
        self
    }

    pub fn with_master_key(mut self, key: impl Into<String>) -> Self {
        self.master_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads the configuration from `PARSE_*` environment variables.
    ///
    /// `PARSE_SERVER_URL` and `PARSE_APP_ID` are required; the keys and
    /// `PARSE_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self, ParseError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] but resolving variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ParseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            non_empty(name).ok_or_else(|| {
                ParseError::InvalidInput(format!("environment variable {} is not set", name))
            })
        };

        let mut config = ClientConfig::new(required(ENV_SERVER_URL)?, required(ENV_APP_ID)?);
        config.rest_api_key = non_empty(ENV_REST_API_KEY);
        config.javascript_key = non_empty(ENV_JAVASCRIPT_KEY);
        config.master_key = non_empty(ENV_MASTER_KEY);
        if let Some(raw) = non_empty(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ParseError::InvalidInput(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

// Keys stay out of debug output.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("app_id", &self.app_id)
            .field("rest_api_key", &redact(&self.rest_api_key))
            .field("javascript_key", &redact(&self.javascript_key))
            .field("master_key", &redact(&self.master_key))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_required_and_optional_values() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_SERVER_URL, "http://localhost:1337/parse"),
            (ENV_APP_ID, "app"),
            (ENV_REST_API_KEY, "rest"),
            (ENV_MASTER_KEY, ""),
            (ENV_TIMEOUT_SECS, " 15 "),
        ]))
        .unwrap();
        assert_eq!(config.server_url, "http://localhost:1337/parse");
        assert_eq!(config.app_id, "app");
        assert_eq!(config.rest_api_key.as_deref(), Some("rest"));
        assert_eq!(config.master_key, None);
        assert_eq!(config.javascript_key, None);
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn missing_app_id_is_an_error() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_SERVER_URL, "http://x")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_APP_ID));
    }

    #[test]
    fn bad_timeout_is_an_error() {
        let err = ClientConfig::from_lookup(lookup_from(&[
            (ENV_SERVER_URL, "http://x"),
            (ENV_APP_ID, "a"),
            (ENV_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidInput(_)));
    }

    #[test]
    fn debug_output_hides_keys() {
        let config = ClientConfig::new("http://x", "a").with_master_key("super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
