//! The picker's state and the only code allowed to change it.
//!
//! [`StateManager`] owns the configuration, the current [`PickerState`] and the
//! registered listeners. Every mutation goes through one of its methods, which
//! emit a [`ChangeEvent`] describing what changed followed by a `state-change`
//! snapshot. Rejected mutations (disabled dates, a full multi-select list,
//! unreadable input) leave the state alone and emit nothing.

use std::fmt;

use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::calendar::{DayCell, MonthGrid, generate_month, year_page_start};
use crate::config::{ConfigError, DatePickerConfig};
use crate::consts::{HOURS_PER_DAY, HOURS_PER_MERIDIEM, MINUTES_PER_HOUR, SECONDS_PER_MINUTE};
use crate::disabled::{DateReader, DisabledDates};
use crate::format::{self, FormatOptions};
use crate::locale::Locale;
use crate::prelude::*;
use crate::selection::{self, DateRange, RangePhase, Selection, Transition};
use crate::types::{DateInput, Month, SelectedTime};
use crate::view::{ViewMode, pick_month, pick_year};

/// Everything the renderer needs to draw the picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerState {
    /// Anchor for the displayed month and year; not a selection.
    pub current_date:                   NaiveDate,
    pub selected_date:                  Option<NaiveDateTime>,
    pub selected_date_range:            DateRange,
    pub selected_dates:                 Vec<NaiveDateTime>,
    pub view_mode:                      ViewMode,
    pub is_open:                        bool,
    pub is_range_selection_in_progress: bool,
    pub is_focused:                     bool,
    pub selected_time:                  Option<SelectedTime>,
}

impl PickerState {
    /// Today, nothing selected, days view, closed.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            current_date: today,
            selected_date: None,
            selected_date_range: DateRange::default(),
            selected_dates: Vec::new(),
            view_mode: ViewMode::Days,
            is_open: false,
            is_range_selection_in_progress: false,
            is_focused: false,
            selected_time: None,
        }
    }

    pub fn selection(&self) -> Selection {
        Selection {
            selected_date: self.selected_date,
            selected_date_range: self.selected_date_range,
            selected_dates: self.selected_dates.clone(),
            is_range_selection_in_progress: self.is_range_selection_in_progress,
        }
    }

    fn store_selection(&mut self, selection: Selection) {
        self.selected_date = selection.selected_date;
        self.selected_date_range = selection.selected_date_range;
        self.selected_dates = selection.selected_dates;
        self.is_range_selection_in_progress = selection.is_range_selection_in_progress;
    }
}

/// The selection in the shape the active mode reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionValue {
    SelectedDate(Option<NaiveDateTime>),
    SelectedDateRange(DateRange),
    SelectedDates(Vec<NaiveDateTime>),
}

/// Payload of `date-change` and of the `on_change` callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    #[serde(flatten)]
    pub value:         SelectionValue,
    /// Present only when time picking is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_time: Option<SelectedTime>,
}

/// A change notification.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ChangeEvent {
    #[display(fmt = "date-change")]
    DateChange(SelectionPayload),
    #[display(fmt = "view-change")]
    ViewChange(ViewMode),
    #[display(fmt = "open")]
    Open,
    #[display(fmt = "close")]
    Close,
    #[display(fmt = "state-change")]
    StateChange(Box<PickerState>),
    #[display(fmt = "time-change")]
    TimeChange(SelectedTime),
}

/// Handle returned by [`StateManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "listener#{}", _0)]
pub struct ListenerId(u64);

/// Field adjusted by [`StateManager::step_time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TimeField {
    #[display(fmt = "hours")]
    Hours,
    #[display(fmt = "minutes")]
    Minutes,
    #[display(fmt = "seconds")]
    Seconds,
    #[display(fmt = "ampm")]
    Meridiem,
}

type Listener = Box<dyn FnMut(&ChangeEvent)>;

pub struct StateManager {
    config:        DatePickerConfig,
    locale:        Locale,
    reader:        DateReader,
    disabled:      DisabledDates,
    /// Fixed "today"; the system date when `None`.
    today:         Option<NaiveDate>,
    state:         PickerState,
    listeners:     Vec<(ListenerId, Listener)>,
    next_listener: u64,
    on_open:       Option<Box<dyn FnMut()>>,
    on_close:      Option<Box<dyn FnMut()>>,
    on_change:     Option<Box<dyn FnMut(&SelectionPayload)>>,
}

impl fmt::Debug for StateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateManager")
            .field("config", &self.config)
            .field("locale", &self.locale.code)
            .field("disabled", &self.disabled)
            .field("today", &self.today)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl StateManager {
    /// Validates `config` and starts from today with nothing selected.
    ///
    /// # Errors
    /// Returns the [`ConfigError`] that [`DatePickerConfig::validate`] would report.
    pub fn new(config: DatePickerConfig) -> Result<Self, ConfigError> {
        Self::build(config, None)
    }

    /// [`StateManager::new`] with `today` standing in for the system date, also
    /// after [`StateManager::reset_state`].
    ///
    /// # Errors
    /// As [`StateManager::new`].
    pub fn starting_at(config: DatePickerConfig, today: NaiveDate) -> Result<Self, ConfigError> {
        Self::build(config, Some(today))
    }

    fn build(config: DatePickerConfig, fixed_today: Option<NaiveDate>) -> Result<Self, ConfigError> {
        config.check_settings()?;
        let today = fixed_today.unwrap_or_else(|| Local::now().date_naive());
        let reader = DateReader::new(&config)?;
        let disabled = DisabledDates::resolve(&config, &reader, today)?;
        let locale = config.resolve_locale().into_owned();

        log::debug!(
            target: "datepick::state",
            "picker ready: locale {}, format {:?}, range {}, multi {}",
            locale.code,
            config.format,
            config.range,
            config.multi_date_selection
        );

        Ok(Self {
            config,
            locale,
            reader,
            disabled,
            today: fixed_today,
            state: PickerState::new(today),
            listeners: Vec::new(),
            next_listener: 0,
            on_open: None,
            on_close: None,
            on_change: None,
        })
    }

    /// The day treated as today.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn config(&self) -> &DatePickerConfig {
        &self.config
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// The bounds and block list, read once from the configuration.
    pub const fn disabled_dates(&self) -> &DisabledDates {
        &self.disabled
    }

    pub fn format_options(&self) -> FormatOptions<'_> {
        self.config.format_options(&self.locale)
    }

    // Observers

    /// Registers `listener` for every change notification.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        before != self.listeners.len()
    }

    pub fn on_open(&mut self, callback: impl FnMut() + 'static) {
        self.on_open = Some(Box::new(callback));
    }

    pub fn on_close(&mut self, callback: impl FnMut() + 'static) {
        self.on_close = Some(Box::new(callback));
    }

    pub fn on_change(&mut self, callback: impl FnMut(&SelectionPayload) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    fn emit(&mut self, event: ChangeEvent) {
        log::trace!(target: "datepick::state", "emit {event}");
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn emit_with_snapshot(&mut self, event: ChangeEvent) {
        self.emit(event);
        self.emit(ChangeEvent::StateChange(Box::new(self.state.clone())));
    }

    /// The current selection shaped for notifications.
    pub fn selection_payload(&self) -> SelectionPayload {
        let value = if self.config.range {
            SelectionValue::SelectedDateRange(self.state.selected_date_range)
        } else if self.config.multi_date_selection {
            SelectionValue::SelectedDates(self.state.selected_dates.clone())
        } else {
            SelectionValue::SelectedDate(self.state.selected_date)
        };
        SelectionPayload {
            value,
            selected_time: self.state.selected_time.filter(|_| self.config.enable_time),
        }
    }

    fn notify_selection(&mut self) {
        let payload = self.selection_payload();
        if let Some(callback) = self.on_change.as_mut() {
            callback(&payload);
        }
        self.emit_with_snapshot(ChangeEvent::DateChange(payload));
    }

    // Selection

    /// Gives `date` the active time of day when time picking is on.
    fn with_selected_time(&self, date: NaiveDateTime) -> NaiveDateTime {
        match (self.config.enable_time, self.state.selected_time) {
            (true, Some(time)) => date.date().and_time(time.to_naive_time()),
            _ => date,
        }
    }

    fn commit(&mut self, transition: Transition) -> bool {
        match transition {
            Transition::Applied(selection) => {
                self.state.store_selection(selection);
                self.notify_selection();
                true
            },
            Transition::Rejected => false,
        }
    }

    /// Offers `date` to the selection, `None` clearing it. Returns `false` when the
    /// date was rejected and nothing changed.
    pub fn set_selected_date(&mut self, date: Option<NaiveDateTime>) -> bool {
        let date = date.map(|date| self.with_selected_time(date));
        let transition = selection::apply(&self.state.selection(), date, &self.config, &self.disabled);
        self.commit(transition)
    }

    /// Selects today and shows its month.
    pub fn select_today(&mut self) -> bool {
        let today = self.today();
        self.set_current_date(today);
        self.set_selected_date(Some(today.and_time(NaiveTime::MIN)))
    }

    /// Applies text typed into the input. Range text is split on `rangeSeparator`
    /// and multi-date text on `multiDateSeparator`; every part must parse and be
    /// selectable or nothing changes. Empty text clears the selection.
    pub fn set_input_text(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return self.set_selected_date(None);
        }

        let separator = if self.config.range {
            Some(self.config.range_separator.as_str())
        } else if self.config.multi_date_selection {
            Some(self.config.multi_date_separator.as_str())
        } else {
            None
        };
        let parts: Vec<&str> = match separator {
            Some(separator) if !separator.is_empty() => text.split(separator).map(str::trim).collect(),
            _ => vec![text],
        };
        if self.config.range && parts.len() > 2 {
            log::debug!(target: "datepick::state", "ignoring input {text:?}: more than two range endpoints");
            return false;
        }

        let opts = self.format_options();
        let today = self.today();
        let Some(dates) = parts
            .iter()
            .map(|part| self.reader.format().parse_at(part, &opts, today))
            .collect::<Option<Vec<_>>>()
        else {
            log::debug!(target: "datepick::state", "ignoring unreadable input {text:?}");
            return false;
        };

        // typed range or multi text replaces the whole selection
        let mut next = if self.config.range || self.config.multi_date_selection {
            Selection::default()
        } else {
            self.state.selection()
        };
        for date in &dates {
            match selection::apply(&next, Some(*date), &self.config, &self.disabled) {
                Transition::Applied(selection) => next = selection,
                Transition::Rejected => return false,
            }
        }

        if let Some(first) = dates.first() {
            self.set_current_date(first.date());
        }
        self.commit(Transition::Applied(next))
    }

    /// The selection as the input shows it.
    pub fn formatted_value(&self) -> String {
        let opts = self.format_options();
        let render = |date: &NaiveDateTime| format::format(date, &self.config.format, &opts);

        if self.config.range {
            let range = &self.state.selected_date_range;
            match (range.start_date, range.end_date) {
                (Some(start), Some(end)) => {
                    format!("{}{}{}", render(&start), self.config.range_separator, render(&end))
                },
                (Some(start), None) => render(&start),
                (None, _) => String::new(),
            }
        } else if self.config.multi_date_selection {
            self.state
                .selected_dates
                .iter()
                .map(render)
                .collect::<Vec<_>>()
                .join(&self.config.multi_date_separator)
        } else {
            self.state.selected_date.as_ref().map(render).unwrap_or_default()
        }
    }

    // Anchor and view

    /// Moves the displayed month without touching the selection.
    pub fn set_current_date(&mut self, date: NaiveDate) {
        if self.state.current_date == date {
            return;
        }
        self.state.current_date = date;
        self.emit(ChangeEvent::StateChange(Box::new(self.state.clone())));
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.state.view_mode == mode {
            return;
        }
        log::trace!(target: "datepick::state", "view {} -> {mode}", self.state.view_mode);
        self.state.view_mode = mode;
        self.emit_with_snapshot(ChangeEvent::ViewChange(mode));
    }

    /// Days, months, years, then back to days.
    pub fn toggle_view_mode(&mut self) {
        self.set_view_mode(self.state.view_mode.next());
    }

    /// Shows `month` of the displayed year, then the days view unless
    /// `keepViewModeOnSelection`.
    pub fn select_month(&mut self, month: Month) {
        let (anchor, view) = pick_month(self.state.current_date, month, self.config.keep_view_mode_on_selection);
        self.set_current_date(anchor);
        self.set_view_mode(view);
    }

    /// Shows `year`, then the months view unless `keepViewModeOnSelection`.
    pub fn select_year(&mut self, year: i32) {
        let (anchor, view) = pick_year(self.state.current_date, year, self.config.keep_view_mode_on_selection);
        self.set_current_date(anchor);
        self.set_view_mode(view);
    }

    // Open / focus

    pub fn set_open(&mut self, open: bool) {
        if self.state.is_open == open {
            return;
        }
        self.state.is_open = open;
        let (event, callback) = if open {
            (ChangeEvent::Open, self.on_open.as_mut())
        } else {
            (ChangeEvent::Close, self.on_close.as_mut())
        };
        if let Some(callback) = callback {
            callback();
        }
        self.emit_with_snapshot(event);
    }

    pub fn toggle_open(&mut self) {
        self.set_open(!self.state.is_open);
    }

    pub fn set_focused(&mut self, focused: bool) {
        if self.state.is_focused == focused {
            return;
        }
        self.state.is_focused = focused;
        self.emit(ChangeEvent::StateChange(Box::new(self.state.clone())));
    }

    // Time

    /// Sets the time of day. With time picking enabled, selected dates move to it.
    pub fn set_selected_time(&mut self, time: SelectedTime) {
        self.state.selected_time = Some(time);
        if self.config.enable_time {
            let at = |date: NaiveDateTime| date.date().and_time(time.to_naive_time());
            self.state.selected_date = self.state.selected_date.map(at);
            let range = &mut self.state.selected_date_range;
            range.start_date = range.start_date.map(at);
            range.end_date = range.end_date.map(at);
            for date in &mut self.state.selected_dates {
                *date = at(*date);
            }
        }

        let payload = self.selection_payload();
        if let Some(callback) = self.on_change.as_mut() {
            callback(&payload);
        }
        self.emit_with_snapshot(ChangeEvent::TimeChange(time));
    }

    /// Moves one time field by `steps` increments (`hourStep` for hours,
    /// `minuteStep` for minutes), wrapping around the clock. Stepping the
    /// meridiem by an odd count swaps AM and PM.
    pub fn step_time(&mut self, field: TimeField, steps: i32) {
        let current = self.state.selected_time.unwrap_or_else(|| {
            SelectedTime::from_naive_time(self.state.selected_date.map_or(NaiveTime::MIN, |date| date.time()))
        });
        let shift = |value: u32, increment: u8, modulus: i64| {
            let moved = (i64::from(value) + i64::from(steps) * i64::from(increment)).rem_euclid(modulus);
            u32::try_from(moved).unwrap_or_default()
        };
        let (mut hours, mut minutes, mut seconds) = (current.hours(), current.minutes(), current.seconds());
        match field {
            TimeField::Hours => hours = shift(hours, self.config.hour_step, HOURS_PER_DAY),
            TimeField::Minutes => minutes = shift(minutes, self.config.minute_step, MINUTES_PER_HOUR),
            TimeField::Seconds => seconds = shift(seconds, 1, SECONDS_PER_MINUTE),
            TimeField::Meridiem => hours = shift(hours, HOURS_PER_MERIDIEM, HOURS_PER_DAY),
        }

        match SelectedTime::new(hours, minutes, seconds) {
            Ok(time) => self.set_selected_time(time),
            Err(err) => log::warn!(target: "datepick::state", "cannot step {field}: {err}"),
        }
    }

    // Bounds

    /// Replaces `minDate`. The old value stays if the new bounds do not validate.
    ///
    /// # Errors
    /// Returns the validation error for the updated configuration.
    pub fn set_min_date(&mut self, min: Option<DateInput>) -> Result<(), ConfigError> {
        let previous = std::mem::replace(&mut self.config.min_date, min);
        self.reload_disabled_dates().inspect_err(|_| self.config.min_date = previous)
    }

    /// Replaces `maxDate`. The old value stays if the new bounds do not validate.
    ///
    /// # Errors
    /// Returns the validation error for the updated configuration.
    pub fn set_max_date(&mut self, max: Option<DateInput>) -> Result<(), ConfigError> {
        let previous = std::mem::replace(&mut self.config.max_date, max);
        self.reload_disabled_dates().inspect_err(|_| self.config.max_date = previous)
    }

    fn reload_disabled_dates(&mut self) -> Result<(), ConfigError> {
        self.disabled = DisabledDates::resolve(&self.config, &self.reader, self.today())?;
        Ok(())
    }

    /// Back to today with nothing selected, days view, closed.
    pub fn reset_state(&mut self) {
        let was_open = self.state.is_open;
        self.state = PickerState::new(self.today());
        if was_open {
            if let Some(callback) = self.on_close.as_mut() {
                callback();
            }
            self.emit(ChangeEvent::Close);
        }
        self.notify_selection();
    }

    // Rendering helpers

    /// Grids for the `visibleMonths` months starting at the displayed one.
    pub fn month_grids(&self) -> Vec<MonthGrid> {
        let today = self.today();
        let anchor = self.state.current_date;
        let Some(first) = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1) else {
            return Vec::new();
        };
        let range = &self.state.selected_date_range;
        let range_complete = range.phase() == RangePhase::Complete;

        (0..u32::from(self.config.visible_months))
            .filter_map(|offset| first.checked_add_months(Months::new(offset)))
            .map(|month_start| {
                let (year, month) = (month_start.year(), month_start.month());
                let weeks = generate_month(year, month, self.locale.first_day_of_week)
                    .into_iter()
                    .map(|week| {
                        week.map(|date| DayCell {
                            date,
                            is_current_month: date.year() == year && date.month() == month,
                            is_today: date == today,
                            is_disabled: self.disabled.is_disabled(date),
                            is_selected: self.is_selected_day(date),
                            is_in_range: range_complete && range.contains(date),
                            is_range_start: range.starts_on(date),
                            is_range_end: range.ends_on(date),
                        })
                    })
                    .collect();
                MonthGrid { year, month, weeks }
            })
            .collect()
    }

    fn is_selected_day(&self, date: NaiveDate) -> bool {
        if self.config.range {
            let range = &self.state.selected_date_range;
            range.starts_on(date) || range.ends_on(date)
        } else if self.config.multi_date_selection {
            self.state.selected_dates.iter().any(|selected| selected.date() == date)
        } else {
            self.state.selected_date.is_some_and(|selected| selected.date() == date)
        }
    }

    /// The `visibleYears` years on the page holding the displayed year.
    pub fn year_page(&self) -> Vec<i32> {
        let start = year_page_start(self.state.current_date.year(), self.config.visible_years);
        (start..start + i32::from(self.config.visible_years)).collect()
    }
}
