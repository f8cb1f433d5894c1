use crate::utils::time::hour_label;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of days shown on the grid
pub const DAYS_IN_VIEW: usize = 7;

/// Number of hour rows on the grid
pub const HOURS_IN_DAY: u32 = 24;

/// The spatial frame events are placed onto
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekGrid {
    pub anchor: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub day_labels: Vec<String>,
    pub hour_labels: Vec<String>,
    pub header_label: String,
}

impl WeekGrid {
    /// Column index of a date, if it falls inside the window
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        self.days.iter().position(|day| *day == date)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.days.last().copied().unwrap_or(self.anchor)
    }
}

/// Build the seven-day window starting at `anchor`.
///
/// The window is not snapped to a week start; whatever day is passed in
/// becomes the first column.
pub fn build_week(anchor: NaiveDate) -> WeekGrid {
    let days: Vec<NaiveDate> = anchor.iter_days().take(DAYS_IN_VIEW).collect();

    let day_labels = days.iter().map(|day| day_label(*day)).collect();
    let hour_labels = (0..HOURS_IN_DAY).map(hour_label).collect();

    let last = days.last().copied().unwrap_or(anchor);

    WeekGrid {
        anchor,
        header_label: header_label(anchor, last),
        days,
        day_labels,
        hour_labels,
    }
}

/// Column label such as `Mon 29`
pub fn day_label(day: NaiveDate) -> String {
    day.format("%a %-d").to_string()
}

/// Compact date span for the week header
pub fn header_label(start: NaiveDate, end: NaiveDate) -> String {
    if start.month() != end.month() || start.year() != end.year() {
        format!(
            "{} - {}, {}",
            start.format("%b %-d"),
            end.format("%b %-d"),
            end.year()
        )
    } else {
        format!("{} - {}, {}", start.format("%b %-d"), end.day(), end.year())
    }
}
