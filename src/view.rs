use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::types::{Month, days_in_month};

/// Which grid the calendar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    #[display(fmt = "days")]
    Days,
    #[display(fmt = "months")]
    Months,
    #[display(fmt = "years")]
    Years,
}

impl ViewMode {
    /// The view an explicit toggle moves to: days, months, years, then back to days.
    pub const fn next(self) -> Self {
        match self {
            Self::Days => Self::Months,
            Self::Months => Self::Years,
            Self::Years => Self::Days,
        }
    }
}

/// `year`-`month`-`day`, with the day clamped to the month's length.
pub(crate) fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)?))
}

/// Moves the anchor to `month` of its year. Drops to the days view unless `keep`.
pub fn pick_month(current: NaiveDate, month: Month, keep: bool) -> (NaiveDate, ViewMode) {
    let anchor = clamped_date(current.year(), month.get(), current.day()).unwrap_or(current);
    (anchor, if keep { ViewMode::Months } else { ViewMode::Days })
}

/// Moves the anchor to `year`, keeping month and day (Feb 29 becomes Feb 28 off leap
/// years). Drops to the months view unless `keep`.
pub fn pick_year(current: NaiveDate, year: i32, keep: bool) -> (NaiveDate, ViewMode) {
    let anchor = clamped_date(year, current.month(), current.day()).unwrap_or(current);
    (anchor, if keep { ViewMode::Years } else { ViewMode::Months })
}
