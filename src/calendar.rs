//! Month grids.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::consts::{DAYS_IN_WEEK, MAX_GRID_ROWS, MIN_DAY, MIN_GRID_ROWS};
use crate::types::days_in_month;

/// One week of a month grid, `first_day_of_week` first.
pub type Week = [NaiveDate; 7];

/// Columns between the grid's first column and the 1st of the month.
///
/// `first_day_of_week` is 0 for Sunday through 6 for Saturday.
pub fn start_offset(year: i32, month: u32, first_day_of_week: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, MIN_DAY).map_or(0, |first| {
        (first.weekday().num_days_from_sunday() + DAYS_IN_WEEK - first_day_of_week % DAYS_IN_WEEK) % DAYS_IN_WEEK
    })
}

/// Builds the grid for `month` of `year`.
///
/// Rows hold 7 consecutive days and start `start_offset` days before the 1st, so the
/// first and last rows carry days of the neighbouring months. The grid has 5 rows when
/// they reach the last day of the month, otherwise 6. An invalid month yields no rows.
pub fn generate_month(year: i32, month: u32, first_day_of_week: u32) -> Vec<Week> {
    let (Some(first), Some(month_days)) = (NaiveDate::from_ymd_opt(year, month, MIN_DAY), days_in_month(year, month))
    else {
        return Vec::new();
    };
    let offset = start_offset(year, month, first_day_of_week);
    let Some(grid_start) = first.checked_sub_days(Days::new(u64::from(offset))) else {
        return Vec::new();
    };

    let covered_rows = (offset + month_days).div_ceil(DAYS_IN_WEEK) as usize;
    let rows = covered_rows.clamp(MIN_GRID_ROWS, MAX_GRID_ROWS);

    let mut cursor = grid_start.iter_days();
    let mut weeks = Vec::with_capacity(rows);
    for _ in 0..rows {
        let mut week = [grid_start; 7];
        for cell in &mut week {
            match cursor.next() {
                Some(day) => *cell = day,
                None => return weeks,
            }
        }
        weeks.push(week);
    }
    weeks
}

/// First year of the page of `page_size` years containing `year`.
pub const fn year_page_start(year: i32, page_size: u16) -> i32 {
    let size = if page_size == 0 { 1 } else { page_size as i32 };
    year - year.rem_euclid(size)
}

/// A grid cell with the flags a renderer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date:             NaiveDate,
    pub is_current_month: bool,
    pub is_today:         bool,
    pub is_disabled:      bool,
    pub is_selected:      bool,
    pub is_in_range:      bool,
    pub is_range_start:   bool,
    pub is_range_end:     bool,
}

/// A decorated month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year:  i32,
    pub month: u32,
    pub weeks: Vec<[DayCell; 7]>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn test_start_offset() {
        // 2024-08-01 is a Thursday
        assert_eq!(start_offset(2024, 8, 0), 4);
        assert_eq!(start_offset(2024, 8, 1), 3);
        assert_eq!(start_offset(2024, 8, 4), 0);
        assert_eq!(start_offset(2024, 8, 5), 6);
    }

    #[test]
    fn test_rows_are_full_weeks() {
        for first_day in 0..7 {
            for month in 1..=12 {
                let grid = generate_month(2024, month, first_day);
                assert!(grid.len() == 5 || grid.len() == 6, "{month}: {} rows", grid.len());
                for week in &grid {
                    for pair in week.windows(2) {
                        assert_eq!(pair[0].succ_opt(), Some(pair[1]));
                    }
                    assert_eq!(week[0].weekday().num_days_from_sunday(), first_day);
                }
            }
        }
    }

    #[test]
    fn test_grid_covers_month_exactly_once() {
        for first_day in [0, 1, 6] {
            for (year, month) in [(2024, 2), (2023, 2), (2024, 9), (2026, 2), (2025, 3)] {
                let grid = generate_month(year, month, first_day);
                let in_month: Vec<u32> = grid
                    .iter()
                    .flatten()
                    .filter(|d| d.year() == year && d.month() == month)
                    .map(Datelike::day)
                    .collect();
                let expected: Vec<u32> = (1..=days_in_month(year, month).expect("valid month")).collect();
                assert_eq!(in_month, expected, "{year}-{month} starting on {first_day}");
            }
        }
    }

    #[test]
    fn test_five_or_six_rows() {
        struct TestCase {
            year:      i32,
            month:     u32,
            first_day: u32,
            rows:      usize,
        }

        let cases = [
            // February 2026 starts on a Sunday and fits four rows, padded to five
            TestCase { year: 2026, month: 2, first_day: 0, rows: 5 },
            // March 2024 starts on a Friday: 5 + 31 cells need six rows
            TestCase { year: 2024, month: 3, first_day: 0, rows: 6 },
            TestCase { year: 2024, month: 3, first_day: 1, rows: 5 },
            // September 2024 starts on a Sunday
            TestCase { year: 2024, month: 9, first_day: 1, rows: 6 },
            TestCase { year: 2024, month: 9, first_day: 0, rows: 5 },
        ];

        for case in &cases {
            assert_eq!(
                generate_month(case.year, case.month, case.first_day).len(),
                case.rows,
                "{}-{} first day {}",
                case.year,
                case.month,
                case.first_day
            );
        }
    }

    #[test]
    fn test_adjacent_month_cells() {
        let grid = generate_month(2024, 8, 0);
        assert_eq!(grid[0][0], date(2024, 7, 28));
        assert_eq!(grid[0][4], date(2024, 8, 1));
        let last_week = grid.last().expect("grid has rows");
        assert_eq!(last_week[6], date(2024, 8, 31));

        let grid = generate_month(2024, 9, 1);
        assert_eq!(grid[0][0], date(2024, 8, 26));
        assert_eq!(grid[0][6], date(2024, 9, 1));
        let last_week = grid.last().expect("grid has rows");
        assert_eq!(last_week[6], date(2024, 10, 6));
    }

    #[test]
    fn test_invalid_month_is_empty() {
        assert!(generate_month(2024, 13, 0).is_empty());
        assert!(generate_month(2024, 0, 0).is_empty());
    }

    #[test]
    fn test_year_page_start() {
        assert_eq!(year_page_start(2024, 12), 2016);
        assert_eq!(year_page_start(2016, 12), 2016);
        assert_eq!(year_page_start(2027, 12), 2016);
        assert_eq!(year_page_start(2028, 12), 2028);
        assert_eq!(year_page_start(2024, 10), 2020);
        assert_eq!(year_page_start(2024, 0), 2024);
    }
}
