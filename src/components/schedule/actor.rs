use super::models::{NewEventPayload, RawEvent};
use super::normalizer::normalize;
use super::orchestrator::{Navigation, Orchestrator, RenderedSchedule, SubmittedEvent};
use super::view::{Transition, ViewEvent, ViewState};
use crate::components::sources::EventSource;
use crate::error::{component_error, ScheduleResult};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Commands that can be sent to the schedule actor
pub enum ScheduleCommand {
    Refresh(mpsc::Sender<RenderedSchedule>),
    Navigate(Navigation, mpsc::Sender<RenderedSchedule>),
    Submit(NewEventPayload, mpsc::Sender<ScheduleResult<SubmittedEvent>>),
    ApplyView(ViewEvent, mpsc::Sender<Transition>),
    CurrentView(mpsc::Sender<ViewState>),
    LastRendered(mpsc::Sender<Option<RenderedSchedule>>),
    Shutdown,
}

/// A finished fetch, tagged with the request that started it
struct FetchOutcome {
    generation: u64,
    result: ScheduleResult<Vec<RawEvent>>,
}

enum ActorEvent {
    Command(Option<ScheduleCommand>),
    Fetched(FetchOutcome),
}

/// The schedule actor that owns the anchor, view state and latest render.
///
/// Only the newest fetch is ever rendered: starting a fetch aborts the one in
/// flight, and every caller still waiting receives the newest result.
pub struct ScheduleActor {
    source: Arc<dyn EventSource>,
    orchestrator: Orchestrator,
    command_rx: mpsc::Receiver<ScheduleCommand>,
    fetch_tx: mpsc::Sender<FetchOutcome>,
    fetch_rx: mpsc::Receiver<FetchOutcome>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    waiters: Vec<mpsc::Sender<RenderedSchedule>>,
}

/// Handle for communicating with the schedule actor
#[derive(Clone)]
pub struct ScheduleActorHandle {
    command_tx: mpsc::Sender<ScheduleCommand>,
}

impl ScheduleActorHandle {
    /// Fetch and render the current week
    pub async fn refresh(&self) -> ScheduleResult<RenderedSchedule> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(ScheduleCommand::Refresh(response_tx)).await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Render was cancelled"))
    }

    /// Move the week and render the new window
    pub async fn navigate(&self, navigation: Navigation) -> ScheduleResult<RenderedSchedule> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(ScheduleCommand::Navigate(navigation, response_tx))
            .await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Render was cancelled"))
    }

    /// Store a new event through the source
    pub async fn submit_event(&self, payload: NewEventPayload) -> ScheduleResult<SubmittedEvent> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(ScheduleCommand::Submit(payload, response_tx))
            .await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Apply a view event
    pub async fn apply_view_event(&self, event: ViewEvent) -> ScheduleResult<Transition> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(ScheduleCommand::ApplyView(event, response_tx))
            .await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Current view state
    pub async fn current_view(&self) -> ScheduleResult<ViewState> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(ScheduleCommand::CurrentView(response_tx)).await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Most recent render, if any
    pub async fn last_rendered(&self) -> ScheduleResult<Option<RenderedSchedule>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.send(ScheduleCommand::LastRendered(response_tx)).await?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> ScheduleResult<()> {
        let _ = self.command_tx.send(ScheduleCommand::Shutdown).await;
        Ok(())
    }

    async fn send(&self, command: ScheduleCommand) -> ScheduleResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))
    }
}

impl ScheduleActor {
    /// Create a new actor and return its handle
    pub fn new(
        source: Arc<dyn EventSource>,
        orchestrator: Orchestrator,
    ) -> (Self, ScheduleActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (fetch_tx, fetch_rx) = mpsc::channel(8);

        let actor = Self {
            source,
            orchestrator,
            command_rx,
            fetch_tx,
            fetch_rx,
            generation: 0,
            in_flight: None,
            waiters: Vec::new(),
        };

        let handle = ScheduleActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Schedule actor started for week of {}", self.orchestrator.anchor());

        loop {
            let event = tokio::select! {
                cmd = self.command_rx.recv() => ActorEvent::Command(cmd),
                Some(outcome) = self.fetch_rx.recv() => ActorEvent::Fetched(outcome),
            };

            match event {
                ActorEvent::Command(None)
                | ActorEvent::Command(Some(ScheduleCommand::Shutdown)) => {
                    info!("Schedule actor shutting down");
                    break;
                }
                ActorEvent::Command(Some(cmd)) => self.handle_command(cmd).await,
                ActorEvent::Fetched(outcome) => self.handle_fetched(outcome).await,
            }
        }

        self.cancel_fetch();
        info!("Schedule actor shut down");
    }

    async fn handle_command(&mut self, cmd: ScheduleCommand) {
        match cmd {
            ScheduleCommand::Refresh(response_tx) => {
                self.start_fetch(Some(response_tx));
            }
            ScheduleCommand::Navigate(navigation, response_tx) => {
                self.orchestrator.navigate(navigation);
                self.start_fetch(Some(response_tx));
            }
            ScheduleCommand::Submit(payload, response_tx) => {
                let result = self.submit(payload).await;
                if result.is_ok() {
                    self.start_fetch(None);
                }
                let _ = response_tx.send(result).await;
            }
            ScheduleCommand::ApplyView(event, response_tx) => {
                let transition = self.orchestrator.apply_view_event(event);
                if transition.teardown {
                    self.cancel_fetch();
                } else if transition.reload {
                    self.start_fetch(None);
                }
                let _ = response_tx.send(transition).await;
            }
            ScheduleCommand::CurrentView(response_tx) => {
                let _ = response_tx.send(self.orchestrator.view()).await;
            }
            ScheduleCommand::LastRendered(response_tx) => {
                let rendered = self.orchestrator.last_rendered().cloned();
                let _ = response_tx.send(rendered).await;
            }
            // Handled in the run loop
            ScheduleCommand::Shutdown => {}
        }
    }

    async fn submit(&self, payload: NewEventPayload) -> ScheduleResult<SubmittedEvent> {
        let record = self.source.submit_event(&payload).await?;
        let normalized = normalize(&record, self.orchestrator.tz());
        info!("Created event {:?}", record.details().title);
        Ok(SubmittedEvent { record, normalized })
    }

    /// Start a fetch that supersedes any fetch in flight
    fn start_fetch(&mut self, waiter: Option<mpsc::Sender<RenderedSchedule>>) {
        if let Some(task) = self.in_flight.take() {
            debug!("Superseding fetch {}", self.generation);
            task.abort();
        }
        self.generation += 1;

        if let Some(waiter) = waiter {
            self.waiters.push(waiter);
        }

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let fetch_tx = self.fetch_tx.clone();

        debug!("Starting fetch {} from {}", generation, source.name());
        self.in_flight = Some(tokio::spawn(async move {
            let result = source.fetch_events().await;
            let _ = fetch_tx.send(FetchOutcome { generation, result }).await;
        }));
    }

    async fn handle_fetched(&mut self, outcome: FetchOutcome) {
        if outcome.generation != self.generation {
            debug!("Ignoring stale fetch {}", outcome.generation);
            return;
        }
        self.in_flight = None;

        let rendered = self.orchestrator.reconcile(outcome.result);
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(rendered.clone()).await;
        }
    }

    /// Abort the fetch in flight and release its waiters without a render
    fn cancel_fetch(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        self.generation += 1;
        self.waiters.clear();
    }
}
