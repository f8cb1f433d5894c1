use super::EventSource;
use crate::components::schedule::models::{decode_events, NewEventPayload, RawEvent};
use crate::error::{fetch_error, other_error, validation_error, ScheduleResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, error};

/// Error body returned by the collaborator
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Collaborator that stores events behind `{base}/api/events`
pub struct RemoteEventSource {
    client: Client,
    events_url: String,
}

impl RemoteEventSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            events_url: format!("{}/api/events", base_url.trim_end_matches('/')),
        }
    }
}

/// The collaborator's `error` message, or the raw body when it is not JSON
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => body,
    }
}

#[async_trait]
impl EventSource for RemoteEventSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn fetch_events(&self) -> ScheduleResult<Vec<RawEvent>> {
        let response = self
            .client
            .get(&self.events_url)
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Request to {} failed: {}", self.events_url, e)))?;

        if !response.status().is_success() {
            return Err(fetch_error(&error_message(response).await));
        }

        let values: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| fetch_error(&format!("Failed to parse events: {}", e)))?;

        debug!("Collaborator returned {} records", values.len());
        Ok(decode_events(values))
    }

    async fn submit_event(&self, payload: &NewEventPayload) -> ScheduleResult<RawEvent> {
        let response = self
            .client
            .post(&self.events_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| other_error(&format!("Request to {} failed: {}", self.events_url, e)))?;

        let status = response.status();
        if status.is_client_error() {
            // Shown to the user as-is
            return Err(validation_error(&error_message(response).await));
        }
        if !status.is_success() {
            let message = error_message(response).await;
            error!("Collaborator rejected event with {}: {}", status, message);
            return Err(other_error(&message));
        }

        response
            .json::<RawEvent>()
            .await
            .map_err(|e| other_error(&format!("Failed to parse created event: {}", e)))
    }
}
