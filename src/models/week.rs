// SPDX-License-Identifier: MIT

//! Week projection for the day selector.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

/// One day in the currently displayed week. Derived, never persisted;
/// recomputed when the reference date ("today") changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekDay {
    pub date: NaiveDate,
    /// English short weekday name ("Mon")
    pub day_name: String,
    /// Day of month (1-31)
    pub day_number: u32,
    /// English short month name ("Jun")
    pub month: String,
    /// True for exactly one entry per week
    pub is_today: bool,
    /// ISO date string (YYYY-MM-DD), the key used for selection
    pub date_string: String,
}

/// Compute the 7 days of the week containing `today`, Monday first.
///
/// Pure function of the reference date; callers memoize by `today` if they
/// need to.
pub fn week_days(today: NaiveDate) -> [WeekDay; 7] {
    let monday = today.week(Weekday::Mon).first_day();

    std::array::from_fn(|i| {
        let date = monday + Duration::days(i as i64);
        WeekDay {
            date,
            day_name: date.format("%a").to_string(),
            day_number: date.day(),
            month: date.format("%b").to_string(),
            is_today: date == today,
            date_string: date.to_string(),
        }
    })
}
