//! `ApiClient` as the backend of every view

use super::{CalendarSource, DashboardSource, TaskRepository};
use crate::client::{ApiClient, ClientResult};
use crate::model::{
    CalendarWindow, DailyAgenda, Id, MonthlyTaskStats, Task, TaskDraft, YearlyTaskStats,
};
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
impl CalendarSource for ApiClient {
    async fn calendar_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ClientResult<CalendarWindow> {
        self.fetch_calendar_window(start, end).await
    }
}

#[async_trait]
impl TaskRepository for ApiClient {
    async fn list(&self) -> ClientResult<Vec<Task>> {
        self.list_tasks().await
    }

    async fn create(&self, draft: &TaskDraft) -> ClientResult<Task> {
        self.create_task(draft).await
    }

    async fn update(&self, id: Id, draft: &TaskDraft) -> ClientResult<Task> {
        self.update_task(id, draft).await
    }

    async fn delete(&self, id: Id) -> ClientResult<()> {
        self.delete_task(id).await
    }
}

#[async_trait]
impl DashboardSource for ApiClient {
    async fn monthly_stats(&self, year: i32, month: u32) -> ClientResult<MonthlyTaskStats> {
        self.monthly_task_stats(year, month).await
    }

    async fn yearly_stats(&self, year: i32) -> ClientResult<YearlyTaskStats> {
        self.yearly_task_stats(year).await
    }

    async fn daily(&self, date: NaiveDate) -> ClientResult<DailyAgenda> {
        self.daily_agenda(date).await
    }

    async fn overdue(&self) -> ClientResult<Vec<Task>> {
        self.overdue_tasks().await
    }
}
