pub mod canvas;
pub mod google_calendar;
pub mod local;
pub mod remote;

pub use canvas::CanvasSource;
pub use google_calendar::GoogleCalendarSource;
pub use local::LocalEventStore;
pub use remote::RemoteEventSource;

use crate::components::schedule::models::{NewEventPayload, RawEvent};
use crate::error::{component_error, fetch_error, ScheduleResult};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// A collaborator that provides raw events and may accept new ones
#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch every event this source knows about
    async fn fetch_events(&self) -> ScheduleResult<Vec<RawEvent>>;

    /// Store a new event and return the stored record
    async fn submit_event(&self, payload: &NewEventPayload) -> ScheduleResult<RawEvent>;
}

/// Several sources read as one.
///
/// Fetches run concurrently and results are concatenated in source order.
/// Submissions go to the first source.
pub struct MergedEventSource {
    sources: Vec<Arc<dyn EventSource>>,
}

impl MergedEventSource {
    pub fn new(sources: Vec<Arc<dyn EventSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl EventSource for MergedEventSource {
    fn name(&self) -> &'static str {
        "merged"
    }

    async fn fetch_events(&self) -> ScheduleResult<Vec<RawEvent>> {
        let results = join_all(self.sources.iter().map(|source| source.fetch_events())).await;

        let mut events = Vec::new();
        let mut failures = Vec::new();

        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(mut fetched) => {
                    info!("Fetched {} events from {}", fetched.len(), source.name());
                    events.append(&mut fetched);
                }
                Err(e) => {
                    warn!("Source {} failed: {}", source.name(), e);
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        if !self.sources.is_empty() && failures.len() == self.sources.len() {
            return Err(fetch_error(&failures.join("; ")));
        }

        Ok(events)
    }

    async fn submit_event(&self, payload: &NewEventPayload) -> ScheduleResult<RawEvent> {
        match self.sources.first() {
            Some(primary) => primary.submit_event(payload).await,
            None => Err(component_error("No writable event source configured")),
        }
    }
}
