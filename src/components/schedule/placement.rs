use super::grid::{build_week, WeekGrid};
use super::models::{EventKind, NormalizedEvent, Priority};
use chrono::{NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Height given to events whose duration is zero or negative
pub const MIN_RENDER_MINUTES: i64 = 30;

/// An event positioned in a (day, hour) cell of the week grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedEvent {
    pub event_id: String,
    pub title: String,
    pub kind: EventKind,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub day: NaiveDate,
    pub day_label: String,
    pub day_index: usize,
    pub hour: u32,
    /// Offset from the top of the hour cell
    pub top_percent: f64,
    /// Height relative to one hour cell; may exceed 100
    pub height_percent: f64,
    pub duration_minutes: i64,
    pub rendered_minutes: i64,
    /// The event runs past the bottom of its starting cell
    pub overflows_cell: bool,
}

/// Everything needed to draw one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub anchor: NaiveDate,
    pub header_label: String,
    pub day_labels: Vec<String>,
    pub hour_labels: Vec<String>,
    pub placed_events: Vec<PlacedEvent>,
}

/// Map events onto the grid.
///
/// Events whose start falls outside the window are left out. Input order is
/// preserved, so events sharing a cell stay in source order.
pub fn place_events(grid: &WeekGrid, events: &[NormalizedEvent], tz: Tz) -> Vec<PlacedEvent> {
    events
        .iter()
        .filter_map(|event| place_event(grid, event, tz))
        .collect()
}

fn place_event(grid: &WeekGrid, event: &NormalizedEvent, tz: Tz) -> Option<PlacedEvent> {
    let local_start = event.anchor_start.with_timezone(&tz);
    let day = local_start.date_naive();

    let Some(day_index) = grid.day_index(day) else {
        trace!("{} starts outside {}", event.id, grid.header_label);
        return None;
    };

    let hour = local_start.hour();
    let minute = local_start.minute();

    let duration_minutes = (event.anchor_end - event.anchor_start).num_minutes();
    let rendered_minutes = if duration_minutes > 0 {
        duration_minutes
    } else {
        MIN_RENDER_MINUTES
    };

    let top_percent = f64::from(minute) / 60.0 * 100.0;
    let height_percent = rendered_minutes as f64 / 60.0 * 100.0;

    Some(PlacedEvent {
        event_id: event.id.clone(),
        title: event.title.clone(),
        kind: event.kind,
        category: event.category.clone(),
        priority: event.priority,
        day,
        day_label: grid.day_labels[day_index].clone(),
        day_index,
        hour,
        top_percent,
        height_percent,
        duration_minutes,
        rendered_minutes,
        overflows_cell: top_percent + height_percent > 100.0,
    })
}

/// Build the grid for `anchor` and place `events` on it
pub fn render_week(anchor: NaiveDate, events: &[NormalizedEvent], tz: Tz) -> WeekView {
    let grid = build_week(anchor);
    let placed_events = place_events(&grid, events, tz);

    WeekView {
        anchor,
        header_label: grid.header_label,
        day_labels: grid.day_labels,
        hour_labels: grid.hour_labels,
        placed_events,
    }
}
