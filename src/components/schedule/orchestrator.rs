use super::agenda::{render_agenda, AgendaRow};
use super::models::{NormalizedEvent, RawEvent};
use super::normalizer::normalize_all;
use super::placement::{render_week, WeekView};
use super::view::{Transition, ViewEvent, ViewState};
use crate::error::ScheduleResult;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ways to move the visible week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Previous,
    Next,
    /// Jump to the current date in the configured zone
    Today,
    To(NaiveDate),
}

/// One complete render of the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSchedule {
    pub anchor: NaiveDate,
    pub week: WeekView,
    pub agenda: Vec<AgendaRow>,
    /// The fetch failed and the render shows an empty set
    pub degraded: bool,
    pub rendered_at: DateTime<Utc>,
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedEvent {
    pub record: RawEvent,
    /// `None` when the stored record carries no date that can be placed
    pub normalized: Option<NormalizedEvent>,
}

/// Today's date in `tz`
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// State owned by the schedule actor: anchor, view and the latest render
#[derive(Debug, Clone)]
pub struct Orchestrator {
    tz: Tz,
    anchor: NaiveDate,
    view: ViewState,
    last: Option<RenderedSchedule>,
}

impl Orchestrator {
    pub fn new(anchor: NaiveDate, tz: Tz) -> Self {
        Self {
            tz,
            anchor,
            view: ViewState::default(),
            last: None,
        }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn last_rendered(&self) -> Option<&RenderedSchedule> {
        self.last.as_ref()
    }

    /// Move the anchor and return the new one
    pub fn navigate(&mut self, navigation: Navigation) -> NaiveDate {
        self.anchor = match navigation {
            Navigation::Previous => self.anchor - Duration::days(7),
            Navigation::Next => self.anchor + Duration::days(7),
            Navigation::Today => today_in(self.tz),
            Navigation::To(date) => date,
        };
        debug!("Week anchor moved to {}", self.anchor);
        self.anchor
    }

    /// Turn a fetch outcome into a render for the current anchor and keep it.
    ///
    /// A failed fetch still renders, with no events and `degraded` set.
    pub fn reconcile(&mut self, fetched: ScheduleResult<Vec<RawEvent>>) -> RenderedSchedule {
        let (raw_events, degraded) = match fetched {
            Ok(raw_events) => (raw_events, false),
            Err(e) => {
                warn!("Rendering an empty schedule: {}", e);
                (Vec::new(), true)
            }
        };

        let rendered = render_schedule(self.anchor, &raw_events, self.tz, degraded);
        self.last = Some(rendered.clone());
        rendered
    }

    /// Apply a view event. Sign-out drops the cached render and resets the
    /// anchor to today.
    pub fn apply_view_event(&mut self, event: ViewEvent) -> Transition {
        let transition = self.view.apply(event);
        self.view = transition.state;
        if transition.teardown {
            self.last = None;
            self.anchor = today_in(self.tz);
        }
        transition
    }
}

/// Normalize `raw_events` and project them onto the week and the agenda
pub fn render_schedule(
    anchor: NaiveDate,
    raw_events: &[RawEvent],
    tz: Tz,
    degraded: bool,
) -> RenderedSchedule {
    let schedule = normalize_all(raw_events, tz);
    let week = render_week(anchor, &schedule.events, tz);
    let agenda = render_agenda(&schedule, tz);

    debug!(
        "Rendered {}: {} placed, {} agenda rows",
        week.header_label,
        week.placed_events.len(),
        agenda.len()
    );

    RenderedSchedule {
        anchor,
        week,
        agenda,
        degraded,
        rendered_at: Utc::now(),
    }
}
