//! # REST event ingestion
//!
//! `POST /api/track` is the endpoint external SDKs feed events into. It
//! authenticates with the account's API key (`X-API-Key` header) rather
//! than the bearer token, and its body is snake_case JSON — it is not a
//! GraphQL operation and does not go through the transport pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use telemetry::Telemetry;

use crate::error::ClientError;
use crate::ClientOptions;

/// Event payload accepted by the ingestion endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TrackEvent {
    pub event_type: String,
    pub event_name: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

impl TrackEvent {
    /// A `custom`-typed event with no properties.
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_type: "custom".to_string(),
            event_name: event_name.into(),
            properties: Value::Object(Default::default()),
            session_id: None,
            url: None,
            referrer: None,
        }
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Acknowledgement returned by the ingestion endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackAck {
    pub success: bool,
    pub event_id: String,
}

/// Minimal client for the ingestion endpoint.
///
/// The API key originates from `me.apiKey` on the signed-in account.
pub struct TrackClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    telemetry: Telemetry,
}

impl TrackClient {
    pub fn new(
        options: &ClientOptions,
        api_key: impl Into<String>,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: options.track_url(),
            api_key: api_key.into(),
            telemetry,
        }
    }

    /// Send one event.
    pub async fn track(&self, event: &TrackEvent) -> Result<TrackAck, ClientError> {
        self.telemetry
            .with_span("track.send", &[("event.name", event.event_name.as_str())], async {
                let response = self
                    .http
                    .post(&self.url)
                    .header("X-API-Key", &self.api_key)
                    .json(event)
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ClientError::Status {
                        status: status.as_u16(),
                    });
                }
                Ok(response.json::<TrackAck>().await?)
            })
            .await
    }
}
