/// Months in a year
pub const MONTHS_IN_YEAR: u32 = 12;

/// Month number for January
pub const JANUARY: u32 = 1;
/// Month number for December
pub const DECEMBER: u32 = 12;

/// First day of month
pub const MIN_DAY: u32 = 1;

/// Last day of the longest months
pub const MAX_DAY: u32 = 31;
/// Length of February in a common year, the shortest month
pub const MIN_MONTH_DAYS: u32 = 28;

/// Columns of a calendar grid
pub const DAYS_IN_WEEK: u32 = 7;
/// A month grid never has fewer rows than this
pub const MIN_GRID_ROWS: usize = 5;
/// ...nor more than this
pub const MAX_GRID_ROWS: usize = 6;

/// Month cells per row in the months view (arrow up/down step)
pub const MONTHS_PER_ROW: u32 = 3;
/// Year cells per row in the years view (arrow up/down step)
pub const YEARS_PER_ROW: i32 = 4;

/// Clock sizes for stepping a time field
pub(crate) const HOURS_PER_DAY: i64 = 24;
pub(crate) const MINUTES_PER_HOUR: i64 = 60;
pub(crate) const SECONDS_PER_MINUTE: i64 = 60;
/// Hours between the same reading in AM and PM
pub(crate) const HOURS_PER_MERIDIEM: u8 = 12;

/// Hour used to normalize a day before bound comparisons
pub(crate) const NOON_HOUR: u32 = 12;

/// Two-digit years are read as `2000 + yy`
pub(crate) const TWO_DIGIT_YEAR_BASE: i32 = 2000;

/// Fallback layout tried when a string date does not match the configured format
pub const ISO_DATE_FORMAT: &str = "yyyy-MM-dd";

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_FORMAT: &str = "MM/dd/yyyy";
pub const DEFAULT_TIME_FORMAT: &str = "hh:mm A";
pub const DEFAULT_RANGE_SEPARATOR: &str = " - ";
pub const DEFAULT_MULTI_DATE_SEPARATOR: &str = ", ";
pub const DEFAULT_AM: &str = "AM";
pub const DEFAULT_PM: &str = "PM";
pub const DEFAULT_VISIBLE_YEARS: u16 = 12;
