use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Naive layouts produced by HTML date/time inputs and hand-written records
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A parsed event timestamp, keeping track of whether a time of day was given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTime {
    /// A full point in time
    Instant(DateTime<Utc>),
    /// A calendar date without a time of day
    Date(NaiveDate),
}

impl ParsedTime {
    /// Whether the source value carried a time of day
    pub fn has_time_of_day(&self) -> bool {
        matches!(self, ParsedTime::Instant(_))
    }

    /// Resolve to an instant, anchoring date-only values at local midnight
    pub fn to_instant(&self, tz: Tz) -> Option<DateTime<Utc>> {
        match self {
            ParsedTime::Instant(instant) => Some(*instant),
            ParsedTime::Date(date) => date
                .and_hms_opt(0, 0, 0)
                .and_then(|midnight| localize(tz, midnight)),
        }
    }

    /// The calendar date this value falls on in the given zone
    pub fn local_date(&self, tz: Tz) -> NaiveDate {
        match self {
            ParsedTime::Instant(instant) => instant.with_timezone(&tz).date_naive(),
            ParsedTime::Date(date) => *date,
        }
    }
}

/// Parse an event timestamp in any of the shapes the sources produce.
///
/// Accepts RFC 3339 (`2025-09-29T10:30:00Z`, `2025-09-29T10:30:00.000+02:00`),
/// naive date-times which are read in `tz`, and plain `YYYY-MM-DD` dates.
/// Blank or unrecognised values yield `None`.
pub fn parse_timestamp(value: &str, tz: Tz) -> Option<ParsedTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(ParsedTime::Instant(dt.with_timezone(&Utc)));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return localize(tz, naive).map(ParsedTime::Instant);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(ParsedTime::Date)
}

/// Interpret a wall-clock time in `tz`.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times
/// inside a spring-forward gap are pushed forward by the gap, so 02:30 on a
/// night that skips 02:00-03:00 becomes 03:30.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// 12-hour clock label for an hour of the day
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{} AM", hour),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}
