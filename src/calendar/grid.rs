//! Month grid: full Sunday-start weeks covering a month

use super::CalendarMonth;
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// One day in a month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from neighbouring months
    pub in_month: bool,
    pub is_today: bool,
}

impl GridCell {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Seven consecutive cells, Sunday through Saturday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
    pub cells: [GridCell; 7],
}

impl Week {
    pub fn start(&self) -> NaiveDate {
        self.cells[0].date
    }

    pub fn end(&self) -> NaiveDate {
        self.cells[6].date
    }
}

/// The weeks covering one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    pub month: CalendarMonth,
    pub weeks: Vec<Week>,
}

impl CalendarGrid {
    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.weeks.first().map(Week::start).unwrap_or(self.month.first_day())
    }

    pub fn last_date(&self) -> NaiveDate {
        self.weeks.last().map(Week::end).unwrap_or(self.month.last_day())
    }

    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.weeks.iter().flat_map(|week| week.cells.iter())
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&GridCell> {
        self.cells().find(|cell| cell.date == date)
    }
}

/// Build the grid for `month`
///
/// Starts on the Sunday on or before the 1st and ends on the Saturday on or
/// after the last day, so a grid spans 4 to 6 weeks.
pub fn build_grid(month: CalendarMonth, today: NaiveDate) -> CalendarGrid {
    let first = month.first_day();
    let last = month.last_day();

    let leading = u64::from(first.weekday().num_days_from_sunday());
    let trailing = 6 - u64::from(last.weekday().num_days_from_sunday());

    let start = first.checked_sub_days(Days::new(leading)).unwrap_or(first);
    let end = last.checked_add_days(Days::new(trailing)).unwrap_or(last);

    let total_days = (end - start).num_days() + 1;
    let week_count = (total_days / 7) as u64;

    let cell = |offset: u64| {
        let date = start.checked_add_days(Days::new(offset)).unwrap_or(end);
        GridCell {
            date,
            in_month: month.contains(date),
            is_today: date == today,
        }
    };

    let weeks = (0..week_count)
        .map(|w| Week {
            cells: std::array::from_fn(|i| cell(w * 7 + i as u64)),
        })
        .collect();

    CalendarGrid { month, weeks }
}
