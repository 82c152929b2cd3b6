//! Quota window arithmetic.

use chrono::{Datelike, Duration, NaiveDate};

/// Sunday on or before `day`.
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_sunday()))
}

/// How many videos are still missing to reach `goal`.
pub fn deficit(goal: usize, existing: usize) -> usize {
    goal.saturating_sub(existing)
}

/// Title of part `part` of a series on `topic`.
pub fn series_title(topic: &str, part: usize) -> String {
    format!("{} - Part {}", topic, part)
}
