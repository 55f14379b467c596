use crate::consts::{DECEMBER, JANUARY, MAX_DAY, MIN_DAY, MIN_MONTH_DAYS, MONTHS_IN_YEAR};
use crate::prelude::*;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;

/// Rejected calendar or clock field values.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum FieldError {
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MONTHS_IN_YEAR)]
    InvalidMonth(u32),
    #[display(fmt = "Invalid time {hours:02}:{minutes:02}:{seconds:02}")]
    InvalidTime { hours: u32, minutes: u32, seconds: u32 },
    #[display(fmt = "Invalid 12-hour reading: {_0} (must be 1-12)")]
    InvalidHour12(u32),
}

impl std::error::Error for FieldError {}

/// A month value guaranteed to be in the range `1..=12`
/// Uses `NonZeroU8` internally, so 0 is not a valid month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Month(NonZeroU8);

impl Month {
    pub const JANUARY: Self = Self(NonZeroU8::MIN);
    pub const DECEMBER: Self = Self(NonZeroU8::MIN.saturating_add((DECEMBER - JANUARY) as u8));

    /// Creates a new Month, validating that it's non-zero and <= 12
    ///
    /// # Errors
    /// Returns `FieldError::InvalidMonth` if the value is 0 or > 12.
    pub fn new(value: u32) -> Result<Self, FieldError> {
        if value > MONTHS_IN_YEAR {
            return Err(FieldError::InvalidMonth(value));
        }
        u8::try_from(value)
            .ok()
            .and_then(NonZeroU8::new)
            .map(Self)
            .ok_or(FieldError::InvalidMonth(value))
    }

    /// Returns the month number (1 = January)
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get() as u32
    }

    /// Zero-based index into locale month tables
    #[inline]
    pub const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Moves by `delta` months, wrapping within the year.
    pub fn wrapping_add(self, delta: i32) -> Self {
        let zero_based = (self.index() as i32 + delta).rem_euclid(MONTHS_IN_YEAR as i32);
        // rem_euclid keeps the value in 0..12, so the +1 is always a valid month
        Self(NonZeroU8::MIN.saturating_add(zero_based as u8))
    }
}

impl TryFrom<u32> for Month {
    type Error = FieldError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u32 {
    fn from(month: Month) -> Self {
        month.get()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half of a 12-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Meridiem {
    #[display(fmt = "AM")]
    Am,
    #[display(fmt = "PM")]
    Pm,
}

impl Meridiem {
    pub const fn of_hour(hours: u32) -> Self {
        if hours < 12 { Self::Am } else { Self::Pm }
    }
}

/// Time of day attached to selections when time picking is enabled.
///
/// `hours` is on the 24-hour clock; `ampm` always agrees with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTime")]
pub struct SelectedTime {
    hours:   u32,
    minutes: u32,
    seconds: u32,
    ampm:    Meridiem,
}

#[derive(Deserialize)]
struct RawTime {
    hours:   u32,
    minutes: u32,
    #[serde(default)]
    seconds: u32,
}

impl TryFrom<RawTime> for SelectedTime {
    type Error = FieldError;

    fn try_from(raw: RawTime) -> Result<Self, Self::Error> {
        Self::new(raw.hours, raw.minutes, raw.seconds)
    }
}

impl SelectedTime {
    /// Creates a time from a 24-hour reading.
    ///
    /// # Errors
    /// Returns `FieldError::InvalidTime` if any field is out of range.
    pub const fn new(hours: u32, minutes: u32, seconds: u32) -> Result<Self, FieldError> {
        if hours > 23 || minutes > 59 || seconds > 59 {
            return Err(FieldError::InvalidTime { hours, minutes, seconds });
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
            ampm: Meridiem::of_hour(hours),
        })
    }

    /// Creates a time from a 12-hour reading (12 AM is midnight, 12 PM is noon).
    ///
    /// # Errors
    /// Returns `FieldError::InvalidHour12` if `hour12` is not in `1..=12`, or
    /// `FieldError::InvalidTime` for bad minutes/seconds.
    pub const fn from_12h(hour12: u32, minutes: u32, seconds: u32, ampm: Meridiem) -> Result<Self, FieldError> {
        if hour12 == 0 || hour12 > 12 {
            return Err(FieldError::InvalidHour12(hour12));
        }
        Self::new(to_24h(hour12, ampm), minutes, seconds)
    }

    pub const fn hours(&self) -> u32 {
        self.hours
    }

    pub const fn minutes(&self) -> u32 {
        self.minutes
    }

    pub const fn seconds(&self) -> u32 {
        self.seconds
    }

    pub const fn ampm(&self) -> Meridiem {
        self.ampm
    }

    /// Hour on the 12-hour clock (`1..=12`)
    pub const fn hour12(&self) -> u32 {
        to_12h(self.hours)
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hours, self.minutes, self.seconds).unwrap_or(NaiveTime::MIN)
    }

    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self {
            hours:   time.hour(),
            minutes: time.minute(),
            seconds: time.second(),
            ampm:    Meridiem::of_hour(time.hour()),
        }
    }
}

impl fmt::Display for SelectedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

pub(crate) const fn to_24h(hour12: u32, ampm: Meridiem) -> u32 {
    match ampm {
        Meridiem::Am => hour12 % 12,
        Meridiem::Pm => hour12 % 12 + 12,
    }
}

pub(crate) const fn to_12h(hours: u32) -> u32 {
    match hours % 12 {
        0 => 12,
        h => h,
    }
}

/// A date given either as a calendar value or as text still to be parsed.
///
/// Serializes as text and always deserializes to the text form, which is read
/// with the configured format before the ISO fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, From)]
pub enum DateInput {
    Date(NaiveDate),
    Text(String),
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl fmt::Display for DateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for DateInput {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::Text)
    }
}

// Helper functions

/// Whether `year` has a February 29. Years outside chrono's range are not leap years.
pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Number of days in `month` of `year`; `None` for a month outside 1-12 or a year chrono cannot represent.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, MIN_DAY)?;
    (MIN_MONTH_DAYS..=MAX_DAY)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
}
