//! Task endpoints

use super::{ApiClient, ClientResult};
use crate::events::{Mutation, ResourceKind};
use crate::model::{Id, MonthlyTaskStats, Task, TaskDraft, TaskStatus, YearlyTaskStats};
use reqwest::Method;

impl ApiClient {
    pub async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
        self.get_json("tasks/", &[], "Failed to load tasks").await
    }

    pub async fn get_task(&self, id: Id) -> ClientResult<Task> {
        self.get_json(&format!("tasks/{}/", id), &[], "Failed to load task")
            .await
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> ClientResult<Task> {
        let task: Task = self
            .send_json(Method::POST, "tasks/", draft, "Failed to create task")
            .await?;
        self.notify(ResourceKind::Tasks, Mutation::Created, Some(task.id));
        Ok(task)
    }

    pub async fn update_task(&self, id: Id, draft: &TaskDraft) -> ClientResult<Task> {
        let task: Task = self
            .send_json(Method::PUT, &format!("tasks/{}/", id), draft, "Failed to update task")
            .await?;
        self.notify(ResourceKind::Tasks, Mutation::Updated, Some(id));
        Ok(task)
    }

    pub async fn delete_task(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("tasks/{}/", id), "Failed to delete task")
            .await?;
        self.notify(ResourceKind::Tasks, Mutation::Deleted, Some(id));
        Ok(())
    }

    /// PUT `task` back with `status`, every other field unchanged
    pub async fn set_task_status(&self, task: &Task, status: TaskStatus) -> ClientResult<Task> {
        let draft = task.to_draft().status(status);
        self.update_task(task.id, &draft).await
    }

    /// Flip a task between done and not done
    ///
    /// Reads the current task first so the update carries fresh fields.
    pub async fn toggle_task_status(&self, id: Id) -> ClientResult<Task> {
        let task = self.get_task(id).await?;
        let next = task.status.toggled();
        self.set_task_status(&task, next).await
    }

    pub async fn monthly_task_stats(&self, year: i32, month: u32) -> ClientResult<MonthlyTaskStats> {
        let query = [("year", year.to_string()), ("month", month.to_string())];
        self.get_json("tasks/stats/monthly/", &query, "Failed to load statistics")
            .await
    }

    pub async fn yearly_task_stats(&self, year: i32) -> ClientResult<YearlyTaskStats> {
        let query = [("year", year.to_string())];
        self.get_json("tasks/stats/yearly/", &query, "Failed to load statistics")
            .await
    }

    /// Open tasks whose due date has passed, earliest first
    pub async fn overdue_tasks(&self) -> ClientResult<Vec<Task>> {
        self.get_json("tasks/overdue/", &[], "Failed to load overdue tasks")
            .await
    }
}
