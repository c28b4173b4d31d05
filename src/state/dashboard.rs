//! Dashboard aggregate: task stats, today's agenda, overdue tasks

use super::DashboardSource;
use crate::client::ClientResult;
use crate::events::{Invalidation, ResourceKind};
use crate::model::{DailyAgenda, MonthlyTaskStats, Task, YearlyTaskStats};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Independently reloadable parts of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DashboardPart {
    MonthlyStats,
    YearlyStats,
    Daily,
    Overdue,
}

impl DashboardPart {
    pub const ALL: [DashboardPart; 4] = [
        DashboardPart::MonthlyStats,
        DashboardPart::YearlyStats,
        DashboardPart::Daily,
        DashboardPart::Overdue,
    ];

    /// Parts whose data depends on `kind`
    pub fn affected_by(kind: ResourceKind) -> &'static [DashboardPart] {
        match kind {
            ResourceKind::Tasks | ResourceKind::Account => &Self::ALL,
            ResourceKind::Schedules => &[DashboardPart::Daily],
            _ => &[],
        }
    }
}

pub struct Dashboard {
    source: Arc<dyn DashboardSource>,
    date: NaiveDate,
    monthly: Option<MonthlyTaskStats>,
    yearly: Option<YearlyTaskStats>,
    daily: Option<DailyAgenda>,
    overdue: Vec<Task>,
    errors: BTreeMap<DashboardPart, String>,
}

impl Dashboard {
    /// Dashboard for the month and year of `date`, with `date` as the agenda day
    pub fn new(source: Arc<dyn DashboardSource>, date: NaiveDate) -> Self {
        Self {
            source,
            date,
            monthly: None,
            yearly: None,
            daily: None,
            overdue: Vec::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn monthly(&self) -> Option<&MonthlyTaskStats> {
        self.monthly.as_ref()
    }

    pub fn yearly(&self) -> Option<&YearlyTaskStats> {
        self.yearly.as_ref()
    }

    pub fn daily(&self) -> Option<&DailyAgenda> {
        self.daily.as_ref()
    }

    pub fn overdue(&self) -> &[Task] {
        &self.overdue
    }

    pub fn error(&self, part: DashboardPart) -> Option<&str> {
        self.errors.get(&part).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Move to another day; stats follow when the month or year changes
    pub async fn select_date(&mut self, date: NaiveDate) {
        let previous = self.date;
        self.date = date;

        let mut parts = vec![DashboardPart::Daily];
        if previous.year() != date.year() {
            parts.extend([DashboardPart::MonthlyStats, DashboardPart::YearlyStats]);
        } else if previous.month() != date.month() {
            parts.push(DashboardPart::MonthlyStats);
        }
        self.reload(&parts).await;
    }

    pub async fn load_all(&mut self) {
        self.reload(&DashboardPart::ALL).await;
    }

    /// Reload what `event` affects; returns the parts reloaded
    pub async fn on_invalidation(&mut self, event: &Invalidation) -> Vec<DashboardPart> {
        let parts = DashboardPart::affected_by(event.kind).to_vec();
        if !parts.is_empty() {
            tracing::debug!(kind = %event.kind, parts = parts.len(), "Dashboard reload");
            self.reload(&parts).await;
        }
        parts
    }

    /// Fetch the given parts concurrently; failed parts keep their old data
    pub async fn reload(&mut self, parts: &[DashboardPart]) {
        let source = self.source.clone();
        let (year, month) = (self.date.year(), self.date.month());
        let date = self.date;
        let wants = |part| parts.contains(&part);

        let (monthly, yearly, daily, overdue) = tokio::join!(
            async {
                if wants(DashboardPart::MonthlyStats) {
                    Some(source.monthly_stats(year, month).await)
                } else {
                    None
                }
            },
            async {
                if wants(DashboardPart::YearlyStats) {
                    Some(source.yearly_stats(year).await)
                } else {
                    None
                }
            },
            async {
                if wants(DashboardPart::Daily) {
                    Some(source.daily(date).await)
                } else {
                    None
                }
            },
            async {
                if wants(DashboardPart::Overdue) {
                    Some(source.overdue().await)
                } else {
                    None
                }
            },
        );

        if let Some(result) = monthly {
            if let Some(value) = self.settle(DashboardPart::MonthlyStats, result) {
                self.monthly = Some(value);
            }
        }
        if let Some(result) = yearly {
            if let Some(value) = self.settle(DashboardPart::YearlyStats, result) {
                self.yearly = Some(value);
            }
        }
        if let Some(result) = daily {
            if let Some(value) = self.settle(DashboardPart::Daily, result) {
                self.daily = Some(value);
            }
        }
        if let Some(result) = overdue {
            if let Some(value) = self.settle(DashboardPart::Overdue, result) {
                self.overdue = value;
            }
        }
    }

    fn settle<T>(&mut self, part: DashboardPart, result: ClientResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.errors.remove(&part);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(part = ?part, error = %e, "Dashboard fetch failed");
                self.errors.insert(part, e.to_string());
                None
            }
        }
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("date", &self.date)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
