//! Task types
//!
//! A task is a to-do entry with a status, a priority and an optional due date.

use super::Id;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A to-do entry as returned by `/tasks/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Write payload carrying every editable field of this task
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Overdue means a due date strictly before `today` and not done
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_done() && self.due_date.map(|d| d < today).unwrap_or(false)
    }
}

/// Progress state of a task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Status after a completion toggle: `Done` reopens to `Todo`,
    /// anything else completes to `Done`.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Done => TaskStatus::Todo,
            TaskStatus::Todo | TaskStatus::InProgress => TaskStatus::Done,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" | "in-progress" | "doing" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" | "med" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(format!("unknown task priority: {}", other)),
        }
    }
}

/// Create/update payload for a task
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// New draft with default status and priority
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }
}

/// Completion numbers for tasks created in one month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTaskStats {
    pub year: i32,
    pub month: u32,
    pub total: u32,
    pub done: u32,
    pub in_progress: u32,
    pub todo: u32,
    pub completion_rate: f64,
}

/// Completion numbers for each month of a year
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearlyTaskStats {
    pub year: i32,
    pub data: Vec<MonthStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthStat {
    pub month: u32,
    pub total: u32,
    pub done: u32,
    pub completion_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_between_todo_and_done() {
        assert_eq!(TaskStatus::Todo.toggled(), TaskStatus::Done);
        assert_eq!(TaskStatus::Done.toggled(), TaskStatus::Todo);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Done);
        assert_eq!(TaskStatus::Todo.toggled().toggled(), TaskStatus::Todo);
    }

    #[test]
    fn test_task_deserializes_backend_payload() {
        let json = r#"{
            "id": 7,
            "owner": null,
            "title": "Send estimate",
            "description": "",
            "status": "in_progress",
            "priority": "high",
            "due_date": "2024-03-15",
            "completed_at": null,
            "created_at": "2024-03-01T09:30:00.123456+09:00",
            "updated_at": "2024-03-02T10:00:00Z"
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert!(task.created_at.is_some());
    }

    #[test]
    fn test_draft_serializes_wire_names() {
        let draft = TaskDraft::new("Call back")
            .status(TaskStatus::InProgress)
            .due(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        let value = serde_json::to_value(&draft).unwrap();

        assert_eq!(value["status"], "in_progress");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["due_date"], "2024-04-01");
    }

    #[test]
    fn test_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut task: Task = serde_json::from_str(
            r#"{"id":1,"title":"t","status":"todo","priority":"low","due_date":"2024-03-09"}"#,
        )
        .unwrap();
        assert!(task.is_overdue(today));

        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(today));

        task.status = TaskStatus::Todo;
        task.due_date = Some(today);
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("later".parse::<TaskStatus>().is_err());
    }
}
