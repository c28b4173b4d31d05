//! Calendar Logic
//!
//! Month grids, week navigation and per-day bucketing of schedules and tasks.
//!
//! Everything here is a pure function of its inputs: grids are recomputed on
//! every navigation and never cached.
//!
//! # Example
//! ```
//! use bizdesk::calendar::{build_grid, CalendarMonth};
//! use chrono::NaiveDate;
//!
//! let month = CalendarMonth::new(2024, 3).unwrap();
//! let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//! let grid = build_grid(month, today);
//!
//! assert_eq!(grid.first_date(), NaiveDate::from_ymd_opt(2024, 2, 25).unwrap());
//! assert_eq!(grid.last_date(), NaiveDate::from_ymd_opt(2024, 4, 6).unwrap());
//! assert_eq!(grid.week_count(), 6);
//! ```

mod buckets;
mod grid;
mod render;
mod week;

pub use buckets::{DayBuckets, DayPreview, PreviewEntry};
pub use grid::{build_grid, CalendarGrid, GridCell, Week};
pub use render::{render_month, render_week};
pub use week::WeekCursor;

use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from calendar arithmetic and parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Year out of range: {0}")]
    YearOutOfRange(i32),

    #[error("Cannot parse '{0}' (expected {1})")]
    Parse(String, &'static str),
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// A displayed month, always anchored on its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    /// Month from a year and a 1-based month number
    pub fn new(year: i32, month: u32) -> CalendarResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        let first =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::YearOutOfRange(year))?;
        Ok(Self { first })
    }

    /// Month from a year and a zero-based month index
    ///
    /// Out-of-range indexes roll over into neighbouring years: index -1 is
    /// December of the previous year, index 12 is January of the next.
    pub fn from_zero_based(year: i32, index: i32) -> CalendarResult<Self> {
        let total = i64::from(year) * 12 + i64::from(index);
        let year = i32::try_from(total.div_euclid(12))
            .map_err(|_| CalendarError::YearOutOfRange(year))?;
        let month = total.rem_euclid(12) as u32 + 1;
        Self::new(year, month)
    }

    /// Month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn current() -> Self {
        Self::containing(today())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// 1-based month number
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn zero_based(&self) -> u32 {
        self.first.month0()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first
            .checked_add_days(Days::new(u64::from(days_in_month(self.year(), self.month())) - 1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Following month; stays put at the end of the representable range
    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// Preceding month; stays put at the start of the representable range
    pub fn prev(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// Date range to fetch for this month: first day of the previous
    /// month through the last day of the next month
    pub fn fetch_window(&self) -> (NaiveDate, NaiveDate) {
        (self.prev().first_day(), self.next().last_day())
    }

    /// Human-readable title, e.g. "March 2024"
    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for CalendarMonth {
    type Err = CalendarError;

    /// Parse `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || CalendarError::Parse(s.to_string(), "YYYY-MM");
        let (year, month) = s.trim().split_once('-').ok_or_else(parse_err)?;
        let year: i32 = year.parse().map_err(|_| parse_err())?;
        let month: u32 = month.parse().map_err(|_| parse_err())?;
        Self::new(year, month)
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> CalendarResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), crate::model::DATE_FORMAT)
        .map_err(|_| CalendarError::Parse(s.to_string(), "YYYY-MM-DD"))
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
