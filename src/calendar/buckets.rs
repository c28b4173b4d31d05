//! Per-day buckets of schedules and tasks

use crate::model::{CalendarWindow, Schedule, Task};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Schedules and tasks partitioned by exact date
///
/// Schedules are keyed by `date`, tasks by `due_date`; tasks without a due
/// date land in no bucket. Items keep the order they were fetched in.
#[derive(Debug, Clone, Default)]
pub struct DayBuckets {
    schedules: BTreeMap<NaiveDate, Vec<Schedule>>,
    tasks: BTreeMap<NaiveDate, Vec<Task>>,
}

impl DayBuckets {
    pub fn new(schedules: &[Schedule], tasks: &[Task]) -> Self {
        let mut buckets = Self::default();
        for schedule in schedules {
            buckets
                .schedules
                .entry(schedule.date)
                .or_default()
                .push(schedule.clone());
        }
        for task in tasks {
            if let Some(due) = task.due_date {
                buckets.tasks.entry(due).or_default().push(task.clone());
            }
        }
        buckets
    }

    pub fn from_window(window: &CalendarWindow) -> Self {
        Self::new(&window.schedules, &window.tasks)
    }

    pub fn schedules_on(&self, date: NaiveDate) -> &[Schedule] {
        self.schedules.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tasks_on(&self, date: NaiveDate) -> &[Task] {
        self.tasks.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of entries (schedules plus tasks) on `date`
    pub fn count_on(&self, date: NaiveDate) -> usize {
        self.schedules_on(date).len() + self.tasks_on(date).len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty() && self.tasks.is_empty()
    }

    /// First `limit` entries for `date`, schedules before tasks
    pub fn preview(&self, date: NaiveDate, limit: usize) -> DayPreview<'_> {
        let entries: Vec<PreviewEntry<'_>> = self
            .schedules_on(date)
            .iter()
            .map(PreviewEntry::Schedule)
            .chain(self.tasks_on(date).iter().map(PreviewEntry::Task))
            .take(limit)
            .collect();

        let overflow = self.count_on(date) - entries.len();
        DayPreview { entries, overflow }
    }
}

/// What a month cell shows for one day
#[derive(Debug, Clone, PartialEq)]
pub struct DayPreview<'a> {
    pub entries: Vec<PreviewEntry<'a>>,
    /// Entries not shown, rendered as "+N"
    pub overflow: usize,
}

impl DayPreview<'_> {
    pub fn overflow_label(&self) -> Option<String> {
        (self.overflow > 0).then(|| format!("+{}", self.overflow))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreviewEntry<'a> {
    Schedule(&'a Schedule),
    Task(&'a Task),
}

impl PreviewEntry<'_> {
    pub fn title(&self) -> &str {
        match self {
            PreviewEntry::Schedule(s) => &s.title,
            PreviewEntry::Task(t) => &t.title,
        }
    }

    /// Short label: start time for timed schedules, a checkbox for tasks
    pub fn label(&self) -> String {
        match self {
            PreviewEntry::Schedule(s) => match (s.is_all_day, s.start_time) {
                (false, Some(start)) => format!("{} {}", start.format("%H:%M"), s.title),
                _ => s.title.clone(),
            },
            PreviewEntry::Task(t) => {
                let mark = if t.is_done() { "[x]" } else { "[ ]" };
                format!("{} {}", mark, t.title)
            }
        }
    }
}
