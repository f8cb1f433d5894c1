use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use horai::components::schedule::agenda::AgendaRow;
use horai::components::schedule::models::{NewEventPayload, RawEvent};
use horai::components::schedule::orchestrator::{today_in, Navigation};
use horai::components::schedule::view::{Page, ViewEvent, ViewState};
use horai::components::schedule::ScheduleHandle;
use horai::components::sources::{EventSource, LocalEventStore};
use horai::error::{fetch_error, Error, ScheduleResult};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock source returning fixed events after an optional delay
struct MockSource {
    events: Vec<RawEvent>,
    fail: bool,
    delay: std::time::Duration,
    calls: AtomicUsize,
}

impl MockSource {
    fn with_events(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            fail: false,
            delay: std::time::Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_events(Vec::new())
        }
    }

    fn slow(events: Vec<RawEvent>, delay_ms: u64) -> Self {
        Self {
            delay: std::time::Duration::from_millis(delay_ms),
            ..Self::with_events(events)
        }
    }
}

#[async_trait]
impl EventSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_events(&self) -> ScheduleResult<Vec<RawEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(fetch_error("collaborator unreachable"));
        }
        Ok(self.events.clone())
    }

    async fn submit_event(&self, _payload: &NewEventPayload) -> ScheduleResult<RawEvent> {
        Err(fetch_error("read-only mock"))
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn sample_events() -> Vec<RawEvent> {
    vec![
        serde_json::from_value(json!({
            "id": "flex-task-1",
            "title": "Study Math",
            "startTime": "2025-09-29T10:30:00Z",
            "endTime": "2025-09-29T12:30:00Z"
        }))
        .unwrap(),
        serde_json::from_value(json!({ "id": "essay", "title": "Essay", "dueDate": "2025-10-20" }))
            .unwrap(),
    ]
}

#[tokio::test]
async fn test_refresh_renders_current_week() {
    let source = Arc::new(MockSource::with_events(sample_events()));
    let handle = ScheduleHandle::new(source.clone(), date(2025, 9, 29), Tz::UTC);

    assert!(handle.last_rendered().await.unwrap().is_none());

    let rendered = handle.refresh().await.unwrap();
    assert_eq!(rendered.anchor, date(2025, 9, 29));
    assert!(!rendered.degraded);
    assert_eq!(rendered.week.header_label, "Sep 29 - Oct 5, 2025");
    assert_eq!(rendered.week.placed_events.len(), 1);
    assert_eq!(rendered.week.placed_events[0].top_percent, 50.0);
    assert_eq!(rendered.agenda.len(), 2);

    let last = handle.last_rendered().await.unwrap().unwrap();
    assert_eq!(last, rendered);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_navigation_moves_anchor() {
    let source = Arc::new(MockSource::with_events(sample_events()));
    let handle = ScheduleHandle::new(source, date(2025, 9, 29), Tz::UTC);

    let next = handle.navigate(Navigation::Next).await.unwrap();
    assert_eq!(next.anchor, date(2025, 10, 6));
    assert!(next.week.placed_events.is_empty());
    // The agenda is not limited to the visible week
    assert_eq!(next.agenda.len(), 2);

    let back = handle.navigate(Navigation::Previous).await.unwrap();
    assert_eq!(back.anchor, date(2025, 9, 29));

    let jumped = handle
        .navigate(Navigation::To(date(2025, 10, 20)))
        .await
        .unwrap();
    assert_eq!(jumped.week.placed_events.len(), 1);
    assert_eq!(jumped.week.placed_events[0].event_id, "essay");

    let today = handle.navigate(Navigation::Today).await.unwrap();
    assert_eq!(today.anchor, today_in(Tz::UTC));
}

#[tokio::test]
async fn test_fetch_failure_degrades_to_empty() {
    let handle = ScheduleHandle::new(Arc::new(MockSource::failing()), date(2025, 9, 29), Tz::UTC);

    let rendered = handle.refresh().await.unwrap();
    assert!(rendered.degraded);
    assert!(rendered.week.placed_events.is_empty());
    assert_eq!(rendered.week.day_labels.len(), 7);
    assert!(matches!(rendered.agenda[0], AgendaRow::Placeholder { .. }));
}

#[tokio::test]
async fn test_overlapping_navigations_deliver_newest_window() {
    let source = Arc::new(MockSource::slow(sample_events(), 50));
    let handle = ScheduleHandle::new(source, date(2025, 9, 29), Tz::UTC);

    let (first, second, third) = tokio::join!(
        handle.navigate(Navigation::Next),
        handle.navigate(Navigation::Next),
        handle.navigate(Navigation::To(date(2025, 9, 29))),
    );

    let first = first.unwrap();
    let second = second.unwrap();
    let third = third.unwrap();

    // Every caller sees the render of the last requested window
    assert_eq!(third.anchor, date(2025, 9, 29));
    assert_eq!(first, third);
    assert_eq!(second, third);

    let last = handle.last_rendered().await.unwrap().unwrap();
    assert_eq!(last, third);
}

#[tokio::test]
async fn test_sequential_requests_are_not_superseded() {
    let source = Arc::new(MockSource::slow(sample_events(), 10));
    let handle = ScheduleHandle::new(source.clone(), date(2025, 9, 29), Tz::UTC);

    let first = handle.navigate(Navigation::Next).await.unwrap();
    let second = handle.navigate(Navigation::Next).await.unwrap();

    assert_eq!(first.anchor, date(2025, 10, 6));
    assert_eq!(second.anchor, date(2025, 10, 13));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_submit_validates_and_rerenders() {
    let store = Arc::new(LocalEventStore::new(Tz::UTC));
    let handle = ScheduleHandle::new(store.clone(), date(2025, 9, 29), Tz::UTC);

    let missing = handle
        .submit_event(NewEventPayload {
            title: "Nothing".to_string(),
            start_time: Some("2025-09-30T10:00".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(missing, Error::ValidationFailure(_)));
    assert_eq!(
        missing.to_string(),
        "Event must have either a Due Date, OR both a Start Time and End Time."
    );

    let backwards = handle
        .submit_event(NewEventPayload {
            title: "Backwards".to_string(),
            start_time: Some("2025-09-30T11:00".to_string()),
            end_time: Some("2025-09-30T10:00".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(backwards.to_string(), "Start Time must be before End Time.");
    assert_eq!(store.len().await, 0);

    let created = handle
        .submit_event(NewEventPayload {
            title: "Lecture".to_string(),
            category: Some("Class".to_string()),
            priority: Some("high".to_string()),
            start_time: Some("2025-09-30T10:00".to_string()),
            end_time: Some("2025-09-30T11:30".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let normalized = created.normalized.unwrap();
    assert_eq!(normalized.title, "Lecture");
    assert!(normalized.has_explicit_time);
    assert_eq!(created.record.details().source.as_deref(), Some("manual"));

    let rendered = handle.refresh().await.unwrap();
    assert_eq!(rendered.week.placed_events.len(), 1);
    assert_eq!(rendered.week.placed_events[0].event_id, normalized.id);
    assert_eq!(rendered.week.placed_events[0].rendered_minutes, 90);
}

#[tokio::test]
async fn test_view_transitions() {
    let source = Arc::new(MockSource::with_events(sample_events()));
    let handle = ScheduleHandle::new(source.clone(), date(2025, 9, 29), Tz::UTC);

    assert_eq!(handle.current_view().await.unwrap(), ViewState::Login);

    let transition = handle
        .apply_view_event(ViewEvent::SignedIn { page: None })
        .await
        .unwrap();
    assert!(transition.reload);
    assert_eq!(
        handle.current_view().await.unwrap(),
        ViewState::Main {
            page: Page::Calendar
        }
    );

    let transition = handle
        .apply_view_event(ViewEvent::Open {
            page: Page::Connections,
        })
        .await
        .unwrap();
    assert!(!transition.reload);

    handle.refresh().await.unwrap();
    assert!(handle.last_rendered().await.unwrap().is_some());

    let transition = handle.apply_view_event(ViewEvent::SignedOut).await.unwrap();
    assert_eq!(transition.state, ViewState::Login);
    assert!(handle.last_rendered().await.unwrap().is_none());
}

#[tokio::test]
async fn test_sign_out_resets_anchor_to_today() {
    let source = Arc::new(MockSource::with_events(sample_events()));
    let handle = ScheduleHandle::new(source, date(2025, 9, 29), Tz::UTC);

    handle
        .apply_view_event(ViewEvent::SignedIn { page: None })
        .await
        .unwrap();
    let moved = handle.navigate(Navigation::Next).await.unwrap();
    assert_eq!(moved.anchor, date(2025, 10, 6));

    handle.apply_view_event(ViewEvent::SignedOut).await.unwrap();
    let rendered = handle.refresh().await.unwrap();
    assert_eq!(rendered.anchor, today_in(Tz::UTC));
}

#[tokio::test]
async fn test_shutdown_closes_mailbox() {
    let handle = ScheduleHandle::new(
        Arc::new(MockSource::with_events(Vec::new())),
        date(2025, 9, 29),
        Tz::UTC,
    );

    handle.shutdown().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert!(matches!(handle.refresh().await, Err(Error::Component(_))));
}
