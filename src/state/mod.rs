//! View State
//!
//! Per-view state holders that call the backend and replace their data
//! only when a call succeeds:
//! - [`CalendarView`]: month/week navigation with request generations
//! - [`TaskBoard`]: the task list, mutated only after server confirmation
//! - [`Dashboard`]: stats, daily agenda and overdue tasks
//!
//! The backend is reached through the traits below, implemented by
//! [`ApiClient`](crate::client::ApiClient), so views can be driven by fakes
//! in tests. Views react to [`Invalidation`](crate::events::Invalidation)s
//! instead of re-fetching implicitly.

mod backend;
mod calendar_view;
mod dashboard;
mod task_board;

pub use calendar_view::{Applied, CalendarView, FetchOutcome, FetchTicket, StalePolicy, ViewMode};
pub use dashboard::{Dashboard, DashboardPart};
pub use task_board::TaskBoard;

use crate::client::ClientResult;
use crate::model::{
    CalendarWindow, DailyAgenda, Id, MonthlyTaskStats, Task, TaskDraft, YearlyTaskStats,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of calendar window data
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn calendar_window(&self, start: NaiveDate, end: NaiveDate)
        -> ClientResult<CalendarWindow>;
}

/// Task persistence used by the task board
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self) -> ClientResult<Vec<Task>>;
    async fn create(&self, draft: &TaskDraft) -> ClientResult<Task>;
    async fn update(&self, id: Id, draft: &TaskDraft) -> ClientResult<Task>;
    async fn delete(&self, id: Id) -> ClientResult<()>;
}

/// Aggregates shown on the dashboard
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn monthly_stats(&self, year: i32, month: u32) -> ClientResult<MonthlyTaskStats>;
    async fn yearly_stats(&self, year: i32) -> ClientResult<YearlyTaskStats>;
    async fn daily(&self, date: NaiveDate) -> ClientResult<DailyAgenda>;
    async fn overdue(&self) -> ClientResult<Vec<Task>>;
}
