use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::DatePickerConfig;
use crate::disabled::DisabledDates;
use crate::prelude::*;

/// Endpoints of a range selection. Either end may be missing, but when both
/// are present `start_date <= end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Option<NaiveDateTime>,
    pub end_date:   Option<NaiveDateTime>,
}

/// Where a range selection stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RangePhase {
    #[display(fmt = "no selection")]
    NoSelection,
    #[display(fmt = "start only")]
    StartOnly,
    #[display(fmt = "complete")]
    Complete,
}

impl DateRange {
    pub const fn phase(&self) -> RangePhase {
        match (self.start_date, self.end_date) {
            (Some(_), Some(_)) => RangePhase::Complete,
            (Some(_), None) => RangePhase::StartOnly,
            (None, _) => RangePhase::NoSelection,
        }
    }

    /// Checks if `day` lies between the endpoints (inclusive). A range with only a
    /// start contains just that day.
    pub fn contains(&self, day: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start.date() <= day && day <= end.date(),
            (Some(start), None) => start.date() == day,
            (None, _) => false,
        }
    }

    pub fn starts_on(&self, day: NaiveDate) -> bool {
        self.start_date.is_some_and(|start| start.date() == day)
    }

    pub fn ends_on(&self, day: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end.date() == day)
    }
}

/// The selection-related part of the picker state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub selected_date:                  Option<NaiveDateTime>,
    pub selected_date_range:            DateRange,
    pub selected_dates:                 Vec<NaiveDateTime>,
    pub is_range_selection_in_progress: bool,
}

/// Outcome of offering a date to the selection machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied(Selection),
    /// Nothing changes: the day is disabled or the multi-select cap is reached.
    Rejected,
}

impl Selection {
    /// Whether `day` is part of the current selection in any mode.
    pub fn includes(&self, day: NaiveDate) -> bool {
        self.selected_date.is_some_and(|d| d.date() == day)
            || self.selected_date_range.contains(day)
            || self.selected_dates.iter().any(|d| d.date() == day)
    }
}

/// Computes the selection after picking `date`; `None` clears the selection.
///
/// - range mode: the first pick starts a range, the second completes it (swapping the
///   endpoints if picked backwards), a third starts over;
/// - multi mode: picking toggles the day in `selected_dates`, up to `max_dates`;
/// - otherwise the pick replaces `selected_date`.
///
/// Days that `disabled` rules out are rejected.
pub fn apply(
    current: &Selection,
    date: Option<NaiveDateTime>,
    config: &DatePickerConfig,
    disabled: &DisabledDates,
) -> Transition {
    let Some(date) = date else {
        return Transition::Applied(Selection {
            selected_date: None,
            selected_date_range: DateRange::default(),
            is_range_selection_in_progress: false,
            ..current.clone()
        });
    };

    if disabled.is_disabled(date.date()) {
        log::debug!(target: "datepick::selection", "ignoring disabled date {date}");
        return Transition::Rejected;
    }

    let mut next = current.clone();
    next.selected_date = Some(date);

    if config.range {
        let range = &mut next.selected_date_range;
        match (range.phase(), range.start_date) {
            (RangePhase::StartOnly, Some(start)) => {
                if date < start {
                    range.end_date = Some(start);
                    range.start_date = Some(date);
                } else {
                    range.end_date = Some(date);
                }
                next.is_range_selection_in_progress = false;
            },
            _ => {
                range.start_date = Some(date);
                range.end_date = None;
                next.is_range_selection_in_progress = true;
            },
        }
        log::trace!(
            target: "datepick::selection",
            "range is now {} ({:?} .. {:?})",
            next.selected_date_range.phase(),
            next.selected_date_range.start_date,
            next.selected_date_range.end_date
        );
        return Transition::Applied(next);
    }

    if config.multi_date_selection {
        let day = date.date();
        if let Some(pos) = next.selected_dates.iter().position(|d| d.date() == day) {
            next.selected_dates.remove(pos);
            next.selected_date = next.selected_dates.last().copied();
        } else if config.max_dates == 0 || next.selected_dates.len() < config.max_dates {
            next.selected_dates.push(date);
        } else {
            log::debug!(
                target: "datepick::selection",
                "ignoring {date}: {} of {} dates already selected",
                next.selected_dates.len(),
                config.max_dates
            );
            return Transition::Rejected;
        }
    }

    Transition::Applied(next)
}
