//! Keyboard navigation over the calendar.
//!
//! The navigator keeps its own focus (a day in the days view, a month in the
//! months view, a year in the years view) separate from the selection. It writes
//! state only through [`StateManager`] methods.

use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveTime};

use crate::calendar::{start_offset, year_page_start};
use crate::consts::{DAYS_IN_WEEK, MIN_DAY, MONTHS_PER_ROW, YEARS_PER_ROW};
use crate::prelude::*;
use crate::state::StateManager;
use crate::types::{Month, days_in_month};
use crate::view::{ViewMode, clamped_date};

/// Keys the navigator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Escape,
}

/// A key name the navigator does not handle.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "Unsupported key: {:?}", _0)]
pub struct UnsupportedKey(pub String);

impl std::error::Error for UnsupportedKey {}

impl FromStr for Key {
    type Err = UnsupportedKey;

    /// Parses a DOM `KeyboardEvent.key` value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            other => return Err(UnsupportedKey(other.to_owned())),
        })
    }
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum KeyOutcome {
    /// Focus moved; the anchor may have moved with it.
    #[display(fmt = "moved")]
    Moved,
    /// The focused day, month or year was committed.
    #[display(fmt = "committed")]
    Committed,
    #[display(fmt = "closed")]
    Closed,
    #[display(fmt = "ignored")]
    Ignored,
}

/// Focus in each view. `day` is relative to the displayed month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusCursor {
    pub day:   u32,
    pub month: Month,
    pub year:  i32,
    /// View the cursor was seeded for.
    pub view:  ViewMode,
}

impl FocusCursor {
    fn seed(manager: &StateManager) -> Self {
        let state = manager.state();
        let anchor = state.current_date;
        let selected = state
            .selected_date
            .or(state.selected_date_range.start_date)
            .or(state.selected_dates.last().copied())
            .map(|date| date.date());
        let day = match selected {
            Some(date) if date.year() == anchor.year() && date.month() == anchor.month() => date.day(),
            _ => anchor.day(),
        };

        Self {
            day,
            month: Month::new(anchor.month()).unwrap_or(Month::JANUARY),
            year: anchor.year(),
            view: state.view_mode,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardNavigator {
    focus: FocusCursor,
}

impl KeyboardNavigator {
    pub fn new(manager: &StateManager) -> Self {
        Self { focus: FocusCursor::seed(manager) }
    }

    pub const fn focus(&self) -> FocusCursor {
        self.focus
    }

    /// The focused day in the displayed month.
    pub fn focused_date(&self, manager: &StateManager) -> Option<NaiveDate> {
        let anchor = manager.state().current_date;
        clamped_date(anchor.year(), anchor.month(), self.focus.day)
    }

    /// Re-seeds focus from the selection and anchor, e.g. after the picker opens.
    pub fn sync(&mut self, manager: &StateManager) {
        self.focus = FocusCursor::seed(manager);
    }

    /// Handles one key press. Keys are ignored while the picker is closed.
    pub fn handle_key(&mut self, key: Key, manager: &mut StateManager) -> KeyOutcome {
        if !manager.state().is_open {
            return KeyOutcome::Ignored;
        }
        if key == Key::Escape {
            manager.set_open(false);
            return KeyOutcome::Closed;
        }
        if self.focus.view != manager.state().view_mode {
            self.sync(manager);
        }

        let outcome = match manager.state().view_mode {
            ViewMode::Days => self.days_key(key, manager),
            ViewMode::Months => self.months_key(key, manager),
            ViewMode::Years => self.years_key(key, manager),
        };
        log::trace!(target: "datepick::keyboard", "{key} -> {outcome}, focus {:?}", self.focus);
        outcome
    }

    fn move_day(&mut self, manager: &mut StateManager, target: Option<NaiveDate>) -> KeyOutcome {
        let Some(target) = target else {
            return KeyOutcome::Ignored;
        };
        let anchor = manager.state().current_date;
        self.focus.day = target.day();
        if (target.year(), target.month()) != (anchor.year(), anchor.month()) {
            manager.set_current_date(target);
        }
        KeyOutcome::Moved
    }

    fn days_key(&mut self, key: Key, manager: &mut StateManager) -> KeyOutcome {
        let anchor = manager.state().current_date;
        let (year, month) = (anchor.year(), anchor.month());
        let (Some(first), Some(dim)) = (NaiveDate::from_ymd_opt(year, month, MIN_DAY), days_in_month(year, month)) else {
            return KeyOutcome::Ignored;
        };
        let day = self.focus.day.clamp(1, dim);
        let prev = first.checked_sub_months(Months::new(1));
        let next = first.checked_add_months(Months::new(1));
        let first_day_of_week = manager.locale().first_day_of_week;
        let offset = start_offset(year, month, first_day_of_week);
        let column = (day - 1 + offset) % DAYS_IN_WEEK;

        let target = match key {
            Key::ArrowLeft if day > MIN_DAY => NaiveDate::from_ymd_opt(year, month, day - 1),
            Key::ArrowLeft => prev.and_then(|p| clamped_date(p.year(), p.month(), u32::MAX)),
            Key::ArrowRight if day < dim => NaiveDate::from_ymd_opt(year, month, day + 1),
            Key::ArrowRight => next,
            Key::ArrowUp if day > DAYS_IN_WEEK => NaiveDate::from_ymd_opt(year, month, day - DAYS_IN_WEEK),
            Key::ArrowUp => prev.and_then(|p| {
                // same column in the last row of the previous month
                let prev_dim = days_in_month(p.year(), p.month())?;
                let prev_offset = start_offset(p.year(), p.month(), first_day_of_week);
                let last_column = (prev_dim - 1 + prev_offset) % DAYS_IN_WEEK;
                let mut target = prev_dim - last_column + column;
                if target > prev_dim {
                    target -= DAYS_IN_WEEK;
                }
                NaiveDate::from_ymd_opt(p.year(), p.month(), target)
            }),
            Key::ArrowDown if day + DAYS_IN_WEEK <= dim => NaiveDate::from_ymd_opt(year, month, day + DAYS_IN_WEEK),
            Key::ArrowDown => next.and_then(|n| {
                // same column in the first row of the next month
                let next_offset = (offset + dim) % DAYS_IN_WEEK;
                let mut target = column as i32 - next_offset as i32 + 1;
                if target < 1 {
                    target += DAYS_IN_WEEK as i32;
                }
                NaiveDate::from_ymd_opt(n.year(), n.month(), target as u32)
            }),
            Key::Home => Some(first),
            Key::End => NaiveDate::from_ymd_opt(year, month, dim),
            Key::PageUp => prev.and_then(|p| clamped_date(p.year(), p.month(), day)),
            Key::PageDown => next.and_then(|n| clamped_date(n.year(), n.month(), day)),
            Key::Enter | Key::Space => {
                return NaiveDate::from_ymd_opt(year, month, day)
                    .map_or(KeyOutcome::Ignored, |date| self.commit_day(date, manager));
            },
            Key::Escape => return KeyOutcome::Ignored,
        };
        self.move_day(manager, target)
    }

    fn commit_day(&mut self, date: NaiveDate, manager: &mut StateManager) -> KeyOutcome {
        if manager.disabled_dates().is_disabled(date) {
            log::debug!(target: "datepick::keyboard", "not committing disabled {date}");
            return KeyOutcome::Ignored;
        }
        if !manager.set_selected_date(Some(date.and_time(NaiveTime::MIN))) {
            return KeyOutcome::Ignored;
        }
        if !manager.state().is_range_selection_in_progress {
            manager.set_open(false);
        }
        KeyOutcome::Committed
    }

    fn months_key(&mut self, key: Key, manager: &mut StateManager) -> KeyOutcome {
        let anchor = manager.state().current_date;
        let step = MONTHS_PER_ROW as i32;
        self.focus.month = match key {
            Key::ArrowLeft => self.focus.month.wrapping_add(-1),
            Key::ArrowRight => self.focus.month.wrapping_add(1),
            Key::ArrowUp => self.focus.month.wrapping_add(-step),
            Key::ArrowDown => self.focus.month.wrapping_add(step),
            Key::Home => Month::JANUARY,
            Key::End => Month::DECEMBER,
            Key::PageUp | Key::PageDown => {
                let year = if key == Key::PageUp { anchor.year() - 1 } else { anchor.year() + 1 };
                if let Some(date) = clamped_date(year, anchor.month(), anchor.day()) {
                    manager.set_current_date(date);
                }
                return KeyOutcome::Moved;
            },
            Key::Enter | Key::Space => {
                if let Some(date) = clamped_date(anchor.year(), self.focus.month.get(), anchor.day()) {
                    manager.set_current_date(date);
                    self.focus.day = date.day();
                }
                manager.set_view_mode(ViewMode::Days);
                self.focus.view = ViewMode::Days;
                return KeyOutcome::Committed;
            },
            Key::Escape => return KeyOutcome::Ignored,
        };
        KeyOutcome::Moved
    }

    fn years_key(&mut self, key: Key, manager: &mut StateManager) -> KeyOutcome {
        let anchor = manager.state().current_date;
        let page_size = manager.config().visible_years;
        let page_start = year_page_start(anchor.year(), page_size);
        let page = i32::from(page_size);

        self.focus.year = match key {
            Key::ArrowLeft => self.focus.year - 1,
            Key::ArrowRight => self.focus.year + 1,
            Key::ArrowUp => self.focus.year - YEARS_PER_ROW,
            Key::ArrowDown => self.focus.year + YEARS_PER_ROW,
            Key::Home => page_start,
            Key::End => page_start + page - 1,
            Key::PageUp => self.focus.year - page,
            Key::PageDown => self.focus.year + page,
            Key::Enter | Key::Space => {
                if let Some(date) = clamped_date(self.focus.year, anchor.month(), anchor.day()) {
                    manager.set_current_date(date);
                }
                manager.set_view_mode(ViewMode::Months);
                self.focus.month = Month::new(anchor.month()).unwrap_or(Month::JANUARY);
                self.focus.view = ViewMode::Months;
                return KeyOutcome::Committed;
            },
            Key::Escape => return KeyOutcome::Ignored,
        };

        if year_page_start(self.focus.year, page_size) != page_start {
            if let Some(date) = clamped_date(self.focus.year, anchor.month(), anchor.day()) {
                manager.set_current_date(date);
            }
        }
        KeyOutcome::Moved
    }
}
