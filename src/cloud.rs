// src/cloud.rs

use crate::client::{AuthType, Parse};
use crate::endpoint::Endpoint;
use crate::error::ParseError;

use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// The `{"result": ...}` wrapper Cloud Code function responses come in.
#[derive(Deserialize, Debug)]
struct CloudFunctionResponse<T> {
    result: T,
}

/// Calls Cloud Code functions and background jobs.
///
/// Obtained from [`Parse::cloud`]. Function calls run with the client's default credentials
/// and session, so Cloud Code sees the logged-in user.
#[derive(Debug)]
pub struct ParseCloud<'a> {
    client: &'a Parse,
}

fn require_name(name: &str, what: &str) -> Result<(), ParseError> {
    if name.trim().is_empty() {
        return Err(ParseError::InvalidInput(format!(
            "{} name cannot be empty.",
            what
        )));
    }
    Ok(())
}

impl<'a> ParseCloud<'a> {
    pub(crate) fn new(client: &'a Parse) -> Self {
        ParseCloud { client }
    }

    /// Runs a Cloud Code function and returns its result. `POST functions/<name>`.
    ///
    /// `params` becomes the JSON body; the `result` field of the response is deserialized
    /// into `R`.
    ///
    /// ```rust,no_run
    /// use parse_rest::{Parse, ParseError};
    /// use serde_json::json;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ParseError> {
    /// let client = Parse::from_env()?;
    /// let greeting: String = client.cloud().run("hello", &json!({"name": "World"})).await?;
    /// println!("{}", greeting);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<P, R>(&self, function_name: &str, params: &P) -> Result<R, ParseError>
    where
        P: Serialize + Send + Sync + ?Sized,
        R: DeserializeOwned,
    {
        require_name(function_name, "Function")?;
        let response_wrapper: CloudFunctionResponse<R> = self
            .client
            ._request(
                Method::POST,
                Endpoint::Function(function_name),
                &[],
                Some(params),
                AuthType::Default,
            )
            .await?;
        Ok(response_wrapper.result)
    }

    /// Starts a background job. `POST jobs/<name>` with the master key.
    ///
    /// The job runs asynchronously on the server; the raw acknowledgement is returned.
    pub async fn trigger_job<P>(&self, job_name: &str, params: &P) -> Result<Value, ParseError>
    where
        P: Serialize + Send + Sync + ?Sized,
    {
        require_name(job_name, "Job")?;
        self.client
            ._request(
                Method::POST,
                Endpoint::Job(job_name),
                &[],
                Some(params),
                AuthType::MasterKey,
            )
            .await
    }
}
