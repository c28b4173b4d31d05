//! Schedule endpoints, including the calendar window consumed by the calendar view

use super::{ApiClient, ClientError, ClientResult};
use crate::events::{Mutation, ResourceKind};
use crate::model::{format_date, CalendarWindow, DailyAgenda, Id, Schedule, ScheduleDraft};
use chrono::NaiveDate;
use reqwest::Method;

impl ApiClient {
    /// List schedules, optionally bounded by date (both ends inclusive)
    pub async fn list_schedules(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ClientResult<Vec<Schedule>> {
        let mut query = Vec::new();
        if let Some(start) = start {
            query.push(("start_date", format_date(start)));
        }
        if let Some(end) = end {
            query.push(("end_date", format_date(end)));
        }
        self.get_json("schedules/", &query, "Failed to load schedules")
            .await
    }

    pub async fn create_schedule(&self, draft: &ScheduleDraft) -> ClientResult<Schedule> {
        Self::check_times(draft)?;
        let schedule: Schedule = self
            .send_json(Method::POST, "schedules/", draft, "Failed to create schedule")
            .await?;
        self.notify(ResourceKind::Schedules, Mutation::Created, Some(schedule.id));
        Ok(schedule)
    }

    pub async fn update_schedule(&self, id: Id, draft: &ScheduleDraft) -> ClientResult<Schedule> {
        Self::check_times(draft)?;
        let schedule: Schedule = self
            .send_json(
                Method::PUT,
                &format!("schedules/{}/", id),
                draft,
                "Failed to update schedule",
            )
            .await?;
        self.notify(ResourceKind::Schedules, Mutation::Updated, Some(id));
        Ok(schedule)
    }

    pub async fn delete_schedule(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("schedules/{}/", id), "Failed to delete schedule")
            .await?;
        self.notify(ResourceKind::Schedules, Mutation::Deleted, Some(id));
        Ok(())
    }

    /// Schedules dated, and tasks due, within `start..=end`
    pub async fn fetch_calendar_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ClientResult<CalendarWindow> {
        if start > end {
            return Err(ClientError::InvalidInput(format!(
                "calendar window starts after it ends ({} > {})",
                start, end
            )));
        }
        let query = [("start_date", format_date(start)), ("end_date", format_date(end))];
        self.get_json("schedules/calendar/", &query, "Failed to load calendar data")
            .await
    }

    pub async fn daily_agenda(&self, date: NaiveDate) -> ClientResult<DailyAgenda> {
        let query = [("date", format_date(date))];
        self.get_json("schedules/daily/", &query, "Failed to load daily data")
            .await
    }

    fn check_times(draft: &ScheduleDraft) -> ClientResult<()> {
        if let (Some(start), Some(end)) = (draft.start_time, draft.end_time) {
            if end < start {
                return Err(ClientError::InvalidInput(
                    "end time is before start time".to_string(),
                ));
            }
        }
        Ok(())
    }
}
