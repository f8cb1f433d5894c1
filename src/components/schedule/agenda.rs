use super::models::{EventKind, NormalizedEvent, NormalizedSchedule, Priority};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One line of the to-do list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "row", rename_all = "camelCase")]
pub enum AgendaRow {
    Entry {
        id: String,
        title: String,
        #[serde(rename = "type")]
        event_type: String,
        #[serde(rename = "formattedDate")]
        formatted_date: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        priority: Option<Priority>,
    },
    /// Shown alone when there is nothing scheduled
    Placeholder { message: String },
}

/// Build the sorted to-do list from every normalized and undated record.
///
/// Nothing is filtered by the visible week. Rows are ordered by start with
/// ties kept in source order, and undated records come last.
pub fn render_agenda(schedule: &NormalizedSchedule, tz: Tz) -> Vec<AgendaRow> {
    if schedule.is_empty() {
        return vec![AgendaRow::Placeholder {
            message: t!("agenda.empty").to_string(),
        }];
    }

    let mut dated: Vec<&NormalizedEvent> = schedule.events.iter().collect();
    // sort_by_key is stable
    dated.sort_by_key(|event| event.anchor_start);

    let mut rows: Vec<AgendaRow> = dated
        .into_iter()
        .map(|event| AgendaRow::Entry {
            id: event.id.clone(),
            title: event.title.clone(),
            event_type: type_label(event.category.as_deref(), event.kind),
            formatted_date: format_event_date(event, tz),
            priority: event.priority,
        })
        .collect();

    rows.extend(schedule.undated.iter().map(|undated| AgendaRow::Entry {
        id: undated.id.clone(),
        title: undated.title.clone(),
        event_type: type_label(undated.category.as_deref(), undated.kind),
        formatted_date: t!("agenda.no_date").to_string(),
        priority: None,
    }));

    rows
}

/// `M/D/YYYY`, with ` hh:mm AM/PM` when the event has a real time of day
pub fn format_event_date(event: &NormalizedEvent, tz: Tz) -> String {
    let show_time = event.has_explicit_time
        || (event.kind == EventKind::ExternalEvent && event.timed_start);
    format_date(event.anchor_start, tz, show_time)
}

fn format_date(instant: DateTime<Utc>, tz: Tz, show_time: bool) -> String {
    let local = instant.with_timezone(&tz);
    if show_time {
        local.format("%-m/%-d/%Y %I:%M %p").to_string()
    } else {
        local.format("%-m/%-d/%Y").to_string()
    }
}

fn type_label(category: Option<&str>, kind: EventKind) -> String {
    category
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| kind.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, start: DateTime<Utc>, kind: EventKind, explicit: bool) -> NormalizedEvent {
        NormalizedEvent {
            id: id.to_string(),
            title: id.to_string(),
            kind,
            category: None,
            anchor_start: start,
            anchor_end: start,
            has_explicit_time: explicit,
            timed_start: explicit,
            priority: None,
        }
    }

    #[test]
    fn test_format_with_and_without_time() {
        let start = Utc.with_ymd_and_hms(2025, 10, 8, 14, 5, 0).unwrap();

        let timed = event("a", start, EventKind::TimedEvent, true);
        assert_eq!(format_event_date(&timed, Tz::UTC), "10/8/2025 02:05 PM");

        let task = event("b", start, EventKind::Task, false);
        assert_eq!(format_event_date(&task, Tz::UTC), "10/8/2025");
    }

    #[test]
    fn test_external_timed_start_shows_time() {
        let start = Utc.with_ymd_and_hms(2025, 10, 8, 9, 0, 0).unwrap();
        let mut external = event("c", start, EventKind::ExternalEvent, false);
        external.timed_start = true;
        assert_eq!(format_event_date(&external, Tz::UTC), "10/8/2025 09:00 AM");
    }

    #[test]
    fn test_format_uses_zone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let start = Utc.with_ymd_and_hms(2025, 10, 8, 2, 0, 0).unwrap();
        let timed = event("d", start, EventKind::TimedEvent, true);
        assert_eq!(format_event_date(&timed, tz), "10/7/2025 10:00 PM");
    }
}
