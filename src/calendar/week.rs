//! Week cursor for the week view

use super::CalendarMonth;
use chrono::{Datelike, Days, NaiveDate};

/// A Sunday-start week, anchored on a focus date
///
/// Stepping moves the anchor by seven days, so the displayed month is the
/// month of the anchor and follows the cursor across month boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCursor {
    anchor: NaiveDate,
}

impl WeekCursor {
    pub fn containing(date: NaiveDate) -> Self {
        Self { anchor: date }
    }

    pub fn today() -> Self {
        Self::containing(super::today())
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Sunday of this week
    pub fn start(&self) -> NaiveDate {
        let offset = u64::from(self.anchor.weekday().num_days_from_sunday());
        self.anchor
            .checked_sub_days(Days::new(offset))
            .unwrap_or(self.anchor)
    }

    /// Saturday of this week
    pub fn end(&self) -> NaiveDate {
        let start = self.start();
        start.checked_add_days(Days::new(6)).unwrap_or(start)
    }

    pub fn days(&self) -> [NaiveDate; 7] {
        let start = self.start();
        std::array::from_fn(|i| {
            start
                .checked_add_days(Days::new(i as u64))
                .unwrap_or(start)
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start() <= date && date <= self.end()
    }

    pub fn next(&self) -> Self {
        Self {
            anchor: self
                .anchor
                .checked_add_days(Days::new(7))
                .unwrap_or(self.anchor),
        }
    }

    pub fn prev(&self) -> Self {
        Self {
            anchor: self
                .anchor
                .checked_sub_days(Days::new(7))
                .unwrap_or(self.anchor),
        }
    }

    /// Month the view should display while this week is shown
    pub fn month(&self) -> CalendarMonth {
        CalendarMonth::containing(self.anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_bounds() {
        // Wednesday
        let week = WeekCursor::containing(date(2024, 3, 13));
        assert_eq!(week.start(), date(2024, 3, 10));
        assert_eq!(week.end(), date(2024, 3, 16));
        assert_eq!(week.start().weekday(), Weekday::Sun);

        let days = week.days();
        assert_eq!(days[0], date(2024, 3, 10));
        assert_eq!(days[6], date(2024, 3, 16));
    }

    #[test]
    fn test_sunday_is_its_own_start() {
        let week = WeekCursor::containing(date(2024, 3, 10));
        assert_eq!(week.start(), date(2024, 3, 10));
    }

    #[test]
    fn test_stepping_moves_month() {
        let week = WeekCursor::containing(date(2024, 3, 28));
        assert_eq!(week.month(), CalendarMonth::new(2024, 3).unwrap());

        let next = week.next();
        assert_eq!(next.anchor(), date(2024, 4, 4));
        assert_eq!(next.month(), CalendarMonth::new(2024, 4).unwrap());
        assert_eq!(next.prev(), week);

        let back = WeekCursor::containing(date(2024, 1, 3)).prev();
        assert_eq!(back.month(), CalendarMonth::new(2023, 12).unwrap());
    }

    #[test]
    fn test_contains() {
        let week = WeekCursor::containing(date(2024, 2, 29));
        assert!(week.contains(date(2024, 3, 2)));
        assert!(week.contains(date(2024, 2, 25)));
        assert!(!week.contains(date(2024, 3, 3)));
    }
}
