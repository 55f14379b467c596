//! Decides whether a day may be selected.
//!
//! `minDate`, `maxDate` and `disabledDates` may be given as text. [`DateReader`]
//! compiles the configured format and the ISO fallback once, and [`DisabledDates`]
//! keeps the days read through it, so checking a day parses nothing.

use std::collections::HashSet;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::{ConfigError, DatePickerConfig};
use crate::consts::{ISO_DATE_FORMAT, NOON_HOUR};
use crate::format::{CompiledFormat, FormatOptions};
use crate::types::DateInput;

/// Reads configured dates: date values as-is, text with the configured format, then ISO.
#[derive(Debug, Clone)]
pub struct DateReader {
    format: CompiledFormat,
    iso:    CompiledFormat,
}

impl DateReader {
    /// Compiles the configured format and the ISO fallback.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidFormat` if the configured format cannot be compiled.
    pub fn new(config: &DatePickerConfig) -> Result<Self, ConfigError> {
        let compile = |pattern: &str, enable_time: bool| {
            CompiledFormat::new(pattern, enable_time).ok_or_else(|| ConfigError::InvalidFormat(pattern.to_owned()))
        };
        Ok(Self {
            format: compile(&config.format, config.enable_time)?,
            iso:    compile(ISO_DATE_FORMAT, false)?,
        })
    }

    /// The configured format.
    pub const fn format(&self) -> &CompiledFormat {
        &self.format
    }

    /// Reads `input` as a calendar day. `today` anchors natural-language text and a missing year.
    pub fn read(&self, input: &DateInput, opts: &FormatOptions<'_>, today: NaiveDate) -> Option<NaiveDate> {
        match input {
            DateInput::Date(date) => Some(*date),
            DateInput::Text(text) => self
                .format
                .parse_at(text, opts, today)
                .or_else(|| self.iso.parse_at(text, &opts.with_natural_language(false), today))
                .map(|parsed| parsed.date()),
        }
    }
}

/// The bounds and block list of a configuration as calendar days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledDates {
    min:     Option<NaiveDate>,
    max:     Option<NaiveDate>,
    blocked: HashSet<NaiveDate>,
}

impl DisabledDates {
    /// Reads `minDate`, `maxDate` and `disabledDates` from `config` through `reader`.
    ///
    /// # Errors
    /// Returns `ConfigError::UnparseableDate` for text that fits neither layout and
    /// `ConfigError::InvertedBounds` when `minDate` is after `maxDate`.
    pub fn resolve(config: &DatePickerConfig, reader: &DateReader, today: NaiveDate) -> Result<Self, ConfigError> {
        let locale = config.locale_or_default();
        let opts = config.format_options(&locale);
        let read = |field: &'static str, input: &DateInput| {
            reader.read(input, &opts, today).ok_or_else(|| ConfigError::UnparseableDate {
                field,
                value: input.to_string(),
                format: config.format.clone(),
            })
        };

        let min = config.min_date.as_ref().map(|input| read("minDate", input)).transpose()?;
        let max = config.max_date.as_ref().map(|input| read("maxDate", input)).transpose()?;
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ConfigError::InvertedBounds { min, max });
            }
        }
        let blocked = config
            .disabled_dates
            .iter()
            .map(|input| read("disabledDates", input))
            .collect::<Result<HashSet<_>, _>>()?;

        log::trace!(
            target: "datepick::disabled",
            "bounds {min:?} .. {max:?}, {} blocked days",
            blocked.len()
        );
        Ok(Self { min, max, blocked })
    }

    /// [`DisabledDates::resolve`] with a freshly compiled reader and the system date.
    ///
    /// # Errors
    /// As [`DateReader::new`] and [`DisabledDates::resolve`].
    pub fn from_config(config: &DatePickerConfig) -> Result<Self, ConfigError> {
        Self::resolve(config, &DateReader::new(config)?, Local::now().date_naive())
    }

    pub const fn min_date(&self) -> Option<NaiveDate> {
        self.min
    }

    pub const fn max_date(&self) -> Option<NaiveDate> {
        self.max
    }

    /// `true` when `date` falls before `minDate`, after `maxDate`, or on a `disabledDates` day.
    ///
    /// Bounds are inclusive: `minDate` counts from the start of its day and `maxDate`
    /// through the end of its day. The candidate is compared at noon.
    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        let Some(candidate) = noon(date) else {
            return true;
        };

        if self.min.is_some_and(|min| candidate < min.and_time(NaiveTime::MIN)) {
            return true;
        }

        if let Some(max) = self.max {
            let end_of_day = max.succ_opt().map(|next| next.and_time(NaiveTime::MIN));
            if end_of_day.is_some_and(|end| candidate >= end) {
                return true;
            }
        }

        self.blocked.contains(&date)
    }
}

fn noon(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(NOON_HOUR, 0, 0)
}

/// One-off [`DisabledDates::is_disabled`] that reads `config` on every call.
/// A configuration whose dates cannot be read disables nothing.
pub fn is_disabled(date: NaiveDate, config: &DatePickerConfig) -> bool {
    DisabledDates::from_config(config).is_ok_and(|rules| rules.is_disabled(date))
}

/// [`is_disabled`] for a date that may still be text. Text that cannot be read is disabled.
pub fn is_disabled_input(input: &DateInput, config: &DatePickerConfig) -> bool {
    let Ok(reader) = DateReader::new(config) else {
        return true;
    };
    let today = Local::now().date_naive();
    let locale = config.locale_or_default();
    let opts = config.format_options(&locale);

    reader.read(input, &opts, today).is_none_or(|date| {
        DisabledDates::resolve(config, &reader, today).is_ok_and(|rules| rules.is_disabled(date))
    })
}
