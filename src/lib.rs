//! Date selection engine for datepicker widgets.
//!
//! [`StateManager`] owns a picker's configuration and state; the other modules are
//! pure helpers it builds on: token formatting and parsing ([`format`]), min/max and
//! block-list checks ([`disabled`]), month grids ([`calendar`]), selection
//! transitions ([`selection`]) and keyboard navigation ([`KeyboardNavigator`]).

mod config;
mod consts;
mod keyboard;
mod locale;
mod prelude;
mod state;
mod types;
mod view;

pub mod calendar;
pub mod disabled;
pub mod format;
pub mod selection;

#[cfg(test)]
mod test_utils;

pub use calendar::{DayCell, MonthGrid};
pub use config::{ConfigError, DatePickerConfig};
pub use disabled::{DateReader, DisabledDates};
pub use consts::*;
pub use format::{CompiledFormat, FormatOptions};
pub use keyboard::{FocusCursor, Key, KeyOutcome, KeyboardNavigator, UnsupportedKey};
pub use locale::Locale;
pub use selection::{DateRange, RangePhase, Selection, Transition};
pub use state::{
    ChangeEvent, ListenerId, PickerState, SelectionPayload, SelectionValue, StateManager, TimeField,
};
pub use types::{DateInput, FieldError, Meridiem, Month, SelectedTime, days_in_month, is_leap_year};
pub use view::{ViewMode, pick_month, pick_year};
