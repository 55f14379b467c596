use std::borrow::Cow;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_AM, DEFAULT_FORMAT, DEFAULT_LOCALE, DEFAULT_MULTI_DATE_SEPARATOR, DEFAULT_PM, DEFAULT_RANGE_SEPARATOR,
    DEFAULT_TIME_FORMAT, DEFAULT_VISIBLE_YEARS,
};
use crate::disabled::DisabledDates;
use crate::format::FormatOptions;
use crate::locale::Locale;
use crate::types::DateInput;

/// Options recognized by the date picker.
///
/// Deserializes from the widget's options object; any key left out keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatePickerConfig {
    pub locale:                       String,
    pub locales:                      HashMap<String, Locale>,
    pub format:                       String,
    pub range:                        bool,
    pub range_separator:              String,
    pub multi_date_selection:         bool,
    pub max_dates:                    usize,
    pub multi_date_separator:         String,
    pub min_date:                     Option<DateInput>,
    pub max_date:                     Option<DateInput>,
    pub disabled_dates:               Vec<DateInput>,
    pub visible_months:               u8,
    pub visible_years:                u16,
    pub keep_view_mode_on_selection:  bool,
    pub enable_time:                  bool,
    pub time_format:                  String,
    pub am:                           String,
    pub pm:                           String,
    pub hour_step:                    u8,
    pub minute_step:                  u8,
    pub enable_natural_language:      bool,
    pub force_leading_zero:           bool,
}

impl Default for DatePickerConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_owned(),
            locales: HashMap::new(),
            format: DEFAULT_FORMAT.to_owned(),
            range: false,
            range_separator: DEFAULT_RANGE_SEPARATOR.to_owned(),
            multi_date_selection: false,
            max_dates: 0,
            multi_date_separator: DEFAULT_MULTI_DATE_SEPARATOR.to_owned(),
            min_date: None,
            max_date: None,
            disabled_dates: Vec::new(),
            visible_months: 1,
            visible_years: DEFAULT_VISIBLE_YEARS,
            keep_view_mode_on_selection: false,
            enable_time: false,
            time_format: DEFAULT_TIME_FORMAT.to_owned(),
            am: DEFAULT_AM.to_owned(),
            pm: DEFAULT_PM.to_owned(),
            hour_step: 1,
            minute_step: 1,
            enable_natural_language: false,
            force_leading_zero: false,
        }
    }
}

/// Error type for configurations the picker refuses to run with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A date given as text matches neither the configured format nor `yyyy-MM-dd`.
    #[error("Cannot parse {field} {value:?} with format {format:?} or yyyy-MM-dd")]
    UnparseableDate {
        field:  &'static str,
        value:  String,
        format: String,
    },

    /// `minDate` is after `maxDate`.
    #[error("Invalid bounds: minDate ({min}) is after maxDate ({max})")]
    InvertedBounds { min: NaiveDate, max: NaiveDate },

    #[error("{0} must be at least 1")]
    ZeroVisible(&'static str),

    #[error("{field} of {value} is out of range")]
    InvalidStep { field: &'static str, value: u8 },

    #[error("Format {0:?} cannot be compiled into a parser")]
    InvalidFormat(String),
}

impl DatePickerConfig {
    fn find_locale(&self) -> Option<Cow<'_, Locale>> {
        self.locales
            .get(&self.locale)
            .map(Cow::Borrowed)
            .or_else(|| Locale::builtin(&self.locale).map(Cow::Owned))
    }

    /// Resolves `locale` against user-supplied `locales`, then the bundled tables.
    /// Unknown codes fall back to English with a warning.
    pub fn resolve_locale(&self) -> Cow<'_, Locale> {
        self.find_locale().unwrap_or_else(|| {
            log::warn!(
                target: "datepick::config",
                "unknown locale {:?}, falling back to {DEFAULT_LOCALE}",
                self.locale
            );
            Cow::Owned(Locale::default())
        })
    }

    /// [`DatePickerConfig::resolve_locale`] without the warning.
    pub(crate) fn locale_or_default(&self) -> Cow<'_, Locale> {
        self.find_locale().unwrap_or_default()
    }

    /// Formatter options derived from this configuration.
    pub fn format_options<'a>(&'a self, locale: &'a Locale) -> FormatOptions<'a> {
        FormatOptions::new(locale)
            .with_meridiem_labels(&self.am, &self.pm)
            .with_time(self.enable_time)
            .with_leading_zero(self.force_leading_zero)
            .with_natural_language(self.enable_natural_language)
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    /// Returns the first problem found: a zero `visibleMonths`/`visibleYears`, a time
    /// step outside its clock range, a format that cannot be compiled, an unreadable
    /// date string, or `minDate > maxDate`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_settings()?;
        DisabledDates::from_config(self).map(drop)
    }

    /// The checks of [`DatePickerConfig::validate`] that need no date parsing.
    pub(crate) fn check_settings(&self) -> Result<(), ConfigError> {
        if self.visible_months == 0 {
            return Err(ConfigError::ZeroVisible("visibleMonths"));
        }
        if self.visible_years == 0 {
            return Err(ConfigError::ZeroVisible("visibleYears"));
        }
        if !(1..=23).contains(&self.hour_step) {
            return Err(ConfigError::InvalidStep { field: "hourStep", value: self.hour_step });
        }
        if !(1..=59).contains(&self.minute_step) {
            return Err(ConfigError::InvalidStep { field: "minuteStep", value: self.minute_step });
        }
        Ok(())
    }
}
