use super::actor::{ScheduleActor, ScheduleActorHandle};
use super::models::NewEventPayload;
use super::orchestrator::{Navigation, Orchestrator, RenderedSchedule, SubmittedEvent};
use super::view::{Transition, ViewEvent, ViewState};
use crate::components::sources::EventSource;
use crate::error::ScheduleResult;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the schedule actor
#[derive(Clone)]
pub struct ScheduleHandle {
    actor_handle: ScheduleActorHandle,
    tz: Tz,
    _actor_task: Arc<JoinHandle<()>>,
}

impl ScheduleHandle {
    /// Create a new ScheduleHandle and spawn the actor
    pub fn new(source: Arc<dyn EventSource>, anchor: NaiveDate, tz: Tz) -> Self {
        let (mut actor, handle) = ScheduleActor::new(source, Orchestrator::new(anchor, tz));

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            tz,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Zone the schedule is rendered in
    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub async fn refresh(&self) -> ScheduleResult<RenderedSchedule> {
        self.actor_handle.refresh().await
    }

    pub async fn navigate(&self, navigation: Navigation) -> ScheduleResult<RenderedSchedule> {
        self.actor_handle.navigate(navigation).await
    }

    /// Store a new event and trigger a re-render
    pub async fn submit_event(&self, payload: NewEventPayload) -> ScheduleResult<SubmittedEvent> {
        self.actor_handle.submit_event(payload).await
    }

    pub async fn apply_view_event(&self, event: ViewEvent) -> ScheduleResult<Transition> {
        self.actor_handle.apply_view_event(event).await
    }

    pub async fn current_view(&self) -> ScheduleResult<ViewState> {
        self.actor_handle.current_view().await
    }

    pub async fn last_rendered(&self) -> ScheduleResult<Option<RenderedSchedule>> {
        self.actor_handle.last_rendered().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> ScheduleResult<()> {
        self.actor_handle.shutdown().await
    }
}
