use super::models::{
    non_blank, EventKind, NormalizedEvent, NormalizedSchedule, Priority, RawEvent, UndatedEvent,
};
use crate::utils::time::{localize, parse_timestamp, ParsedTime};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::{debug, trace};
use uuid::Uuid;

/// Hour of day that date-only due dates are anchored at
pub const DUE_DATE_HOUR: u32 = 9;

/// Length given to due-date tasks
pub const DUE_DATE_DURATION_MINUTES: i64 = 60;

/// Date values pulled out of a raw record before parsing
struct DateFields<'a> {
    start: Option<&'a str>,
    end: Option<&'a str>,
    due: Option<&'a str>,
}

impl<'a> DateFields<'a> {
    fn of(raw: &'a RawEvent) -> Self {
        match raw {
            RawEvent::LocalTask(task) => Self {
                start: None,
                end: None,
                due: non_blank(task.due_date.as_deref()),
            },
            RawEvent::LocalTimed(event) => Self {
                start: non_blank(event.start_time.as_deref()),
                end: non_blank(event.end_time.as_deref()),
                due: non_blank(event.due_date.as_deref()),
            },
            RawEvent::External(entry) => Self {
                start: entry.start.as_ref().and_then(|start| start.value()),
                end: entry.end.as_ref().and_then(|end| end.value()),
                due: None,
            },
        }
    }
}

/// Convert one raw record into the canonical shape.
///
/// Returns `None` when no usable date can be extracted. The result depends
/// only on `raw` and `tz`.
pub fn normalize(raw: &RawEvent, tz: Tz) -> Option<NormalizedEvent> {
    let fields = DateFields::of(raw);

    let start = fields.start.and_then(|value| parse_timestamp(value, tz));
    let end = fields.end.and_then(|value| parse_timestamp(value, tz));
    let due = fields.due.and_then(|value| parse_timestamp(value, tz));

    let has_explicit_time = matches!(
        (start, end),
        (Some(start), Some(end)) if start.has_time_of_day() && end.has_time_of_day()
    );

    let (kind, anchor_start, anchor_end) = match (due, start) {
        (Some(due), _) if !(start.is_some() && end.is_some()) => {
            let anchor_start = due_date_anchor(due, tz)?;
            trace!("Anchoring {:?} at its due date", raw.details().title);
            (
                EventKind::Task,
                anchor_start,
                anchor_start + Duration::minutes(DUE_DATE_DURATION_MINUTES),
            )
        }
        (_, Some(start)) => {
            let anchor_start = start.to_instant(tz)?;
            let anchor_end = end
                .and_then(|end| end.to_instant(tz))
                .unwrap_or(anchor_start);
            (raw.shape_kind(), anchor_start, anchor_end)
        }
        _ => return None,
    };

    let details = raw.details();
    Some(NormalizedEvent {
        id: event_id(raw),
        title: display_title(raw),
        kind,
        category: details.category.clone(),
        anchor_start,
        anchor_end,
        has_explicit_time,
        timed_start: start.map(|start| start.has_time_of_day()).unwrap_or(false),
        priority: details.priority.as_deref().and_then(Priority::parse),
    })
}

/// Normalize a fetched batch, keeping records without a usable date aside
pub fn normalize_all(raw_events: &[RawEvent], tz: Tz) -> NormalizedSchedule {
    let mut schedule = NormalizedSchedule::default();

    for raw in raw_events {
        match normalize(raw, tz) {
            Some(event) => schedule.events.push(event),
            None => {
                debug!("Event {:?} has no usable date", raw.details().title);
                schedule.undated.push(UndatedEvent {
                    id: event_id(raw),
                    title: display_title(raw),
                    kind: raw.shape_kind(),
                    category: raw.details().category.clone(),
                });
            }
        }
    }

    debug!(
        "Normalized {} events, {} without a date",
        schedule.events.len(),
        schedule.undated.len()
    );
    schedule
}

/// Due date's calendar day at 09:00 local time
fn due_date_anchor(due: ParsedTime, tz: Tz) -> Option<DateTime<Utc>> {
    due.local_date(tz)
        .and_hms_opt(DUE_DATE_HOUR, 0, 0)
        .and_then(|nine| localize(tz, nine))
}

fn display_title(raw: &RawEvent) -> String {
    raw.details()
        .title
        .clone()
        .unwrap_or_else(|| t!("event.untitled").to_string())
}

/// Source id, or a name-based UUID over the record contents
fn event_id(raw: &RawEvent) -> String {
    if let Some(id) = &raw.details().id {
        return id.clone();
    }

    let contents = serde_json::to_string(raw).unwrap_or_default();
    Uuid::new_v5(&Uuid::NAMESPACE_OID, contents.as_bytes()).to_string()
}
