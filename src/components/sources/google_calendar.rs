use super::EventSource;
use crate::components::schedule::models::{decode_events, NewEventPayload, RawEvent};
use crate::error::{component_error, fetch_error, ScheduleResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Days before now included in the fetch, so the current week is complete
const LOOK_BEHIND_DAYS: i64 = 7;

/// Largest page the events list endpoint returns
const MAX_RESULTS: &str = "2500";

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// Read-only view of one Google calendar
pub struct GoogleCalendarSource {
    client: Client,
    api_base: String,
    calendar_id: String,
    access_token: String,
    lookahead_days: i64,
    tz: Tz,
}

impl GoogleCalendarSource {
    pub fn new(calendar_id: &str, access_token: &str, lookahead_days: i64, tz: Tz) -> Self {
        Self {
            client: Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            calendar_id: calendar_id.to_string(),
            access_token: access_token.to_string(),
            lookahead_days,
            tz,
        }
    }

    /// Point the source at another API root
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self) -> ScheduleResult<Url> {
        let now = Utc::now();
        let time_min = (now - Duration::days(LOOK_BEHIND_DAYS)).to_rfc3339();
        let time_max = (now + Duration::days(self.lookahead_days)).to_rfc3339();

        let url_str = format!("{}/calendars/{}/events", self.api_base, self.calendar_id);
        let mut url = Url::parse(&url_str)
            .map_err(|e| fetch_error(&format!("Failed to parse URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("timeMin", &time_min)
            .append_pair("timeMax", &time_max)
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime")
            .append_pair("timeZone", self.tz.name())
            .append_pair("maxResults", MAX_RESULTS);

        Ok(url)
    }
}

#[async_trait]
impl EventSource for GoogleCalendarSource {
    fn name(&self) -> &'static str {
        "google_calendar"
    }

    async fn fetch_events(&self) -> ScheduleResult<Vec<RawEvent>> {
        let url = self.events_url()?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Google Calendar request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(fetch_error(&format!(
                "Google Calendar returned HTTP {} - {}",
                status, error_body
            )));
        }

        let page: EventsPage = response
            .json()
            .await
            .map_err(|e| fetch_error(&format!("Failed to parse events response: {}", e)))?;

        let mut events = decode_events(page.items);
        for event in &mut events {
            event.details_mut().source = Some("google".to_string());
        }

        debug!("Google Calendar returned {} events", events.len());
        Ok(events)
    }

    async fn submit_event(&self, _payload: &NewEventPayload) -> ScheduleResult<RawEvent> {
        Err(component_error("Google Calendar is read-only"))
    }
}
