use crate::error::{validation_error, ScheduleResult};
use crate::utils::time::parse_timestamp;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

pub const MISSING_DATES_MESSAGE: &str =
    "Event must have either a Due Date, OR both a Start Time and End Time.";
pub const START_AFTER_END_MESSAGE: &str = "Start Time must be before End Time.";

/// Fields every source shape may carry besides its dates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDetails {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Free-form `type` label chosen by the user or the source
    pub category: Option<String>,
    pub priority: Option<String>,
    pub description: Option<String>,
    /// Where the record came from (`manual`, `google`, `canvas`, ...)
    pub source: Option<String>,
}

/// Locally created task that only has a due date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalTask {
    pub details: EventDetails,
    pub due_date: Option<String>,
}

/// Locally created event with a start and/or end time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalTimedEvent {
    pub details: EventDetails,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub due_date: Option<String>,
}

/// Start or end of an external calendar entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTime {
    #[serde(
        rename = "dateTime",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_time: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(
        rename = "timeZone",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_zone: Option<String>,
}

impl ExternalTime {
    /// The timed value if present, else the all-day date
    pub fn value(&self) -> Option<&str> {
        non_blank(self.date_time.as_deref()).or_else(|| non_blank(self.date.as_deref()))
    }
}

/// Entry from an external calendar with nested `start`/`end` objects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalCalendarEntry {
    pub details: EventDetails,
    pub start: Option<ExternalTime>,
    pub end: Option<ExternalTime>,
}

/// An unnormalized event as received from any source.
///
/// The JSON shapes are told apart by which date fields are present: nested
/// `start`/`end` objects make an external entry, any start or end time makes
/// a timed local event, and everything else is a due-date task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord", into = "RawRecord")]
pub enum RawEvent {
    LocalTask(LocalTask),
    LocalTimed(LocalTimedEvent),
    External(ExternalCalendarEntry),
}

impl RawEvent {
    pub fn details(&self) -> &EventDetails {
        match self {
            RawEvent::LocalTask(task) => &task.details,
            RawEvent::LocalTimed(event) => &event.details,
            RawEvent::External(entry) => &entry.details,
        }
    }

    pub fn details_mut(&mut self) -> &mut EventDetails {
        match self {
            RawEvent::LocalTask(task) => &mut task.details,
            RawEvent::LocalTimed(event) => &mut event.details,
            RawEvent::External(entry) => &mut entry.details,
        }
    }

    /// Kind implied by the source shape alone
    pub fn shape_kind(&self) -> EventKind {
        match self {
            RawEvent::LocalTask(_) => EventKind::Task,
            RawEvent::LocalTimed(_) => EventKind::TimedEvent,
            RawEvent::External(_) => EventKind::ExternalEvent,
        }
    }
}

/// Flat wire record covering every key spelling the sources use.
///
/// The spaced and lower-case variants (`start time`, `endtime`, `duedate`)
/// are kept as separate fields so records carrying both spellings still
/// decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_id", default, deserialize_with = "lenient_string", skip_serializing)]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing)]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        rename = "dueDate",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<String>,
    #[serde(rename = "duedate", default, deserialize_with = "lenient_string", skip_serializing)]
    pub due_date_lower: Option<String>,
    #[serde(
        rename = "startTime",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<String>,
    #[serde(rename = "start time", default, deserialize_with = "lenient_string", skip_serializing)]
    pub start_time_spaced: Option<String>,
    #[serde(
        rename = "endTime",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<String>,
    #[serde(rename = "endtime", default, deserialize_with = "lenient_string", skip_serializing)]
    pub end_time_lower: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<ExternalTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<ExternalTime>,
}

impl From<RawRecord> for RawEvent {
    fn from(record: RawRecord) -> Self {
        let details = EventDetails {
            id: first_present(record.id, record.object_id),
            title: first_present(record.title, record.summary),
            category: first_present(record.category, None),
            priority: first_present(record.priority, None),
            description: first_present(record.description, record.desc),
            source: first_present(record.source, None),
        };

        // Lower-case and spaced spellings win, matching the legacy frontend
        let due_date = first_present(record.due_date_lower, record.due_date);
        let start_time = first_present(record.start_time_spaced, record.start_time);
        let end_time = first_present(record.end_time_lower, record.end_time);

        if record.start.is_some() || record.end.is_some() {
            return RawEvent::External(ExternalCalendarEntry {
                details,
                start: record.start,
                end: record.end,
            });
        }

        if start_time.is_some() || end_time.is_some() {
            return RawEvent::LocalTimed(LocalTimedEvent {
                details,
                start_time,
                end_time,
                due_date,
            });
        }

        RawEvent::LocalTask(LocalTask { details, due_date })
    }
}

impl From<RawEvent> for RawRecord {
    fn from(event: RawEvent) -> Self {
        let (details, mut record) = match event {
            RawEvent::LocalTask(task) => (
                task.details,
                RawRecord {
                    due_date: task.due_date,
                    ..Default::default()
                },
            ),
            RawEvent::LocalTimed(timed) => (
                timed.details,
                RawRecord {
                    start_time: timed.start_time,
                    end_time: timed.end_time,
                    due_date: timed.due_date,
                    ..Default::default()
                },
            ),
            RawEvent::External(entry) => {
                let record = RawRecord {
                    summary: entry.details.title.clone(),
                    start: entry.start,
                    end: entry.end,
                    ..Default::default()
                };
                let mut details = entry.details;
                details.title = None;
                (details, record)
            }
        };

        record.id = details.id;
        record.title = details.title;
        record.category = details.category;
        record.priority = details.priority;
        record.description = details.description;
        record.source = details.source;
        record
    }
}

/// Classification of a normalized event, used for styling and grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Task,
    TimedEvent,
    ExternalEvent,
}

impl EventKind {
    /// Label shown in the agenda when the source gave no `type`
    pub fn label(&self) -> String {
        match self {
            EventKind::Task => t!("kind.task").to_string(),
            EventKind::TimedEvent => t!("kind.timed_event").to_string(),
            EventKind::ExternalEvent => t!("kind.external_event").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Parse the spellings used by the frontend form and the task store
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "med" | "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Canonical event used by placement and the agenda
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub id: String,
    pub title: String,
    pub kind: EventKind,
    pub category: Option<String>,
    pub anchor_start: DateTime<Utc>,
    pub anchor_end: DateTime<Utc>,
    /// Both start and end were given with a time of day
    pub has_explicit_time: bool,
    /// The start value itself carried a time of day
    pub timed_start: bool,
    pub priority: Option<Priority>,
}

/// A record that could not be placed because it has no usable date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndatedEvent {
    pub id: String,
    pub title: String,
    pub kind: EventKind,
    pub category: Option<String>,
}

/// Result of normalizing one fetch, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSchedule {
    pub events: Vec<NormalizedEvent>,
    pub undated: Vec<UndatedEvent>,
}

impl NormalizedSchedule {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.undated.is_empty()
    }
}

/// Body of a create-event submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventPayload {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl NewEventPayload {
    /// Check the date rule every writable store enforces.
    ///
    /// Exactly one of a due date or a start/end pair must be present, and a
    /// start/end pair must be strictly ordered. Times that do not parse are
    /// left for the store to reject.
    pub fn validate(&self, tz: Tz) -> ScheduleResult<()> {
        let due_date = non_blank(self.due_date.as_deref());
        let start_time = non_blank(self.start_time.as_deref());
        let end_time = non_blank(self.end_time.as_deref());

        let has_due_date = due_date.is_some();
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if has_due_date {
                return Err(validation_error(MISSING_DATES_MESSAGE));
            }
            let start = parse_timestamp(start, tz).and_then(|parsed| parsed.to_instant(tz));
            let end = parse_timestamp(end, tz).and_then(|parsed| parsed.to_instant(tz));
            return match (start, end) {
                (Some(start), Some(end)) if start >= end => {
                    Err(validation_error(START_AFTER_END_MESSAGE))
                }
                _ => Ok(()),
            };
        }

        if has_due_date {
            Ok(())
        } else {
            Err(validation_error(MISSING_DATES_MESSAGE))
        }
    }

    /// Build the stored record for this payload
    pub fn into_raw_event(self, id: String, source: &str) -> RawEvent {
        let details = EventDetails {
            id: Some(id),
            title: non_blank(Some(&self.title)).map(ToOwned::to_owned),
            category: self.category,
            priority: self.priority,
            description: self.description,
            source: Some(source.to_string()),
        };

        let has_time = non_blank(self.start_time.as_deref()).is_some()
            || non_blank(self.end_time.as_deref()).is_some();
        if has_time {
            RawEvent::LocalTimed(LocalTimedEvent {
                details,
                start_time: self.start_time,
                end_time: self.end_time,
                due_date: self.due_date,
            })
        } else {
            RawEvent::LocalTask(LocalTask {
                details,
                due_date: self.due_date,
            })
        }
    }
}

/// Decode a fetched JSON array, skipping records that are not event objects
pub fn decode_events(values: Vec<serde_json::Value>) -> Vec<RawEvent> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawEvent>(value) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping malformed event record: {}", e);
                None
            }
        })
        .collect()
}

/// Trim and drop blank strings
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn first_present(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    non_blank(preferred.as_deref())
        .or_else(|| non_blank(fallback.as_deref()))
        .map(ToOwned::to_owned)
}

/// Accept strings, numbers and booleans; anything else reads as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        Some(serde_json::Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}
