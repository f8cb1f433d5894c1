use super::EventSource;
use crate::components::schedule::models::{decode_events, NewEventPayload, RawEvent};
use crate::error::ScheduleResult;
use async_trait::async_trait;
use chrono_tz::Tz;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// In-memory event store used when no remote collaborator is configured
pub struct LocalEventStore {
    events: RwLock<Vec<RawEvent>>,
    tz: Tz,
}

impl LocalEventStore {
    pub fn new(tz: Tz) -> Self {
        Self::with_events(Vec::new(), tz)
    }

    pub fn with_events(events: Vec<RawEvent>, tz: Tz) -> Self {
        Self {
            events: RwLock::new(events),
            tz,
        }
    }

    /// Load the initial records from a JSON array on disk
    pub async fn from_seed_file(path: impl AsRef<Path>, tz: Tz) -> ScheduleResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let values: Vec<serde_json::Value> = serde_json::from_str(&content)?;
        let events = decode_events(values);

        info!("Seeded {} events from {}", events.len(), path.display());
        Ok(Self::with_events(events, tz))
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl EventSource for LocalEventStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn fetch_events(&self) -> ScheduleResult<Vec<RawEvent>> {
        Ok(self.events.read().await.clone())
    }

    async fn submit_event(&self, payload: &NewEventPayload) -> ScheduleResult<RawEvent> {
        payload.validate(self.tz)?;

        let event = payload
            .clone()
            .into_raw_event(Uuid::new_v4().to_string(), "manual");

        self.events.write().await.push(event.clone());
        info!("Stored event {:?}", event.details().title);
        Ok(event)
    }
}
