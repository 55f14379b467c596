use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use datepick::format::{self, FormatOptions};
use datepick::{
    ChangeEvent, DatePickerConfig, Key, KeyOutcome, KeyboardNavigator, Locale, SelectionValue, StateManager, ViewMode,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    date(year, month, day).and_time(NaiveTime::MIN)
}

#[test]
fn leap_day_round_trips_through_dd_mm_yyyy() {
    let locale = Locale::default();
    let opts = FormatOptions::new(&locale);
    let leap_day = midnight(2024, 2, 29);

    let text = format::format(&leap_day, "dd/MM/yyyy", &opts);
    assert_eq!(text, "29/02/2024");
    assert_eq!(format::parse(&text, "dd/MM/yyyy", &opts), Some(leap_day));
}

#[test]
fn arrow_up_keeps_the_weekday_column() {
    // October 2024 starts on a Tuesday, two columns into a Sunday-first grid
    let mut manager = StateManager::starting_at(DatePickerConfig::default(), date(2024, 10, 3)).expect("valid config");
    manager.set_open(true);
    let mut navigator = KeyboardNavigator::new(&manager);

    assert_eq!(navigator.handle_key(Key::ArrowUp, &mut manager), KeyOutcome::Moved);
    assert_eq!(navigator.focused_date(&manager), Some(date(2024, 9, 26)));
    assert_eq!(manager.state().current_date, date(2024, 9, 26));
}

#[test]
fn backwards_range_is_swapped() {
    let config = DatePickerConfig { range: true, ..DatePickerConfig::default() };
    let mut manager = StateManager::new(config).expect("valid config");

    assert!(manager.set_selected_date(Some(midnight(2024, 1, 31))));
    assert!(manager.state().is_range_selection_in_progress);
    assert!(manager.set_selected_date(Some(midnight(2024, 1, 5))));

    let range = manager.state().selected_date_range;
    assert_eq!(range.start_date, Some(midnight(2024, 1, 5)));
    assert_eq!(range.end_date, Some(midnight(2024, 1, 31)));
    assert!(!manager.state().is_range_selection_in_progress);
}

#[test]
fn date_before_min_date_is_ignored() {
    let config: DatePickerConfig = serde_json::from_str(r#"{"minDate": "2024-08-20"}"#).expect("valid json");
    let mut manager = StateManager::new(config).expect("valid config");
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    manager.subscribe(move |event: &ChangeEvent| sink.borrow_mut().push(event.to_string()));

    assert!(!manager.set_selected_date(Some(midnight(2024, 8, 19))));
    assert_eq!(manager.state().selected_date, None);
    assert!(events.borrow().is_empty());
}

#[test]
fn tomorrow_is_next_local_midnight() {
    let expected = Local::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .map(|day| day.and_time(NaiveTime::MIN));
    assert_eq!(format::parse_natural_language("tomorrow"), expected);

    let locale = Locale::default();
    let opts = FormatOptions::new(&locale).with_natural_language(true);
    assert_eq!(format::parse("Tomorrow", "MM/dd/yyyy", &opts), expected);
}

#[test]
fn full_keyboard_session() {
    let config = DatePickerConfig {
        locale: "de".to_owned(),
        format: "dd.MM.yyyy".to_owned(),
        ..DatePickerConfig::default()
    };
    let mut manager = StateManager::starting_at(config, date(2024, 5, 10)).expect("valid config");
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    manager.on_change(move |payload| sink.borrow_mut().push(payload.value.clone()));

    manager.set_open(true);
    let mut navigator = KeyboardNavigator::new(&manager);

    // pick a year, then a month, then a day
    manager.set_view_mode(ViewMode::Years);
    for key in [Key::ArrowRight, Key::Enter, Key::End, Key::Enter, Key::Home, Key::Enter] {
        navigator.handle_key(key, &mut manager);
    }

    assert!(!manager.state().is_open);
    assert_eq!(manager.state().selected_date, Some(midnight(2025, 12, 1)));
    assert_eq!(manager.formatted_value(), "01.12.2025");
    assert_eq!(*changes.borrow(), vec![SelectionValue::SelectedDate(Some(midnight(2025, 12, 1)))]);
}

#[test]
fn grids_follow_the_locale() {
    let config = DatePickerConfig {
        locale: "fr".to_owned(),
        visible_months: 3,
        ..DatePickerConfig::default()
    };
    let manager = StateManager::starting_at(config, date(2024, 9, 15)).expect("valid config");
    let grids = manager.month_grids();

    assert_eq!(grids.len(), 3);
    // Monday-first: September 2024 starts on a Sunday, in the last column
    assert_eq!(grids[0].weeks[0][6].date, date(2024, 9, 1));
    assert_eq!(grids[0].weeks.len(), 6);
    assert_eq!(manager.locale().weekday_headers()[0], manager.locale().weekdays_short[1]);
}
