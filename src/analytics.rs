// src/analytics.rs
use crate::client::{AuthType, Parse};
use crate::endpoint::Endpoint;
use crate::error::ParseError;
use crate::types::ParseDate;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Parse analytics keeps at most this many dimensions per event.
pub const MAX_EVENT_DIMENSIONS: usize = 8;

const APP_OPENED_EVENT: &str = "AppOpened";

#[derive(Serialize, Debug)]
struct EventRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    at: Option<ParseDate>,
}

impl Parse {
    /// Records that the app was opened. `POST events/AppOpened`.
    ///
    /// `at` backdates the event; the server uses the time of the request when it is `None`.
    pub async fn track_app_opened(&self, at: Option<ParseDate>) -> Result<(), ParseError> {
        self.send_event(APP_OPENED_EVENT, None, at).await
    }

    /// Tracks a custom event with optional dimensions. `POST events/<name>`.
    ///
    /// # Arguments
    /// * `event_name`: The name of the event to track (e.g., "ButtonClicked", "Search").
    /// * `dimensions`: Up to [`MAX_EVENT_DIMENSIONS`] string pairs to segment the event by.
    /// * `at`: When the event happened; defaults to the time of the request.
    pub async fn track_event(
        &self,
        event_name: &str,
        dimensions: Option<&BTreeMap<String, String>>,
        at: Option<ParseDate>,
    ) -> Result<(), ParseError> {
        if event_name.trim().is_empty() {
            return Err(ParseError::InvalidInput(
                "Event name cannot be empty.".to_string(),
            ));
        }
        if let Some(dims) = dimensions {
            if dims.len() > MAX_EVENT_DIMENSIONS {
                return Err(ParseError::InvalidInput(format!(
                    "Events support at most {} dimensions, got {}.",
                    MAX_EVENT_DIMENSIONS,
                    dims.len()
                )));
            }
        }
        self.send_event(event_name, dimensions, at).await
    }

    async fn send_event(
        &self,
        event_name: &str,
        dimensions: Option<&BTreeMap<String, String>>,
        at: Option<ParseDate>,
    ) -> Result<(), ParseError> {
        let body = EventRequest { dimensions, at };
        // The server answers `{}` on success.
        let _: Value = self
            ._request(
                Method::POST,
                Endpoint::Event(event_name),
                &[],
                Some(&body),
                AuthType::Default,
            )
            .await?;
        log::debug!("Tracked analytics event '{}'", event_name);
        Ok(())
    }
}
