//! Shorthand constructors for tests.

use chrono::{NaiveDate, NaiveDateTime};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("test date must be valid")
}

pub fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    date(year, month, day)
        .and_hms_opt(hour, minute, second)
        .expect("test time must be valid")
}

/// Midnight of the given day, the form selections take without a time of day.
pub fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
    datetime(year, month, day, 0, 0, 0)
}
