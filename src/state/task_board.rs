//! Task board state
//!
//! The local list changes only after the server confirms a mutation; a
//! failed call leaves it exactly as it was and stores the error text.

use super::TaskRepository;
use crate::client::{ClientError, ClientResult};
use crate::model::{Id, Task, TaskDraft, TaskStatus};
use std::collections::HashMap;
use std::sync::Arc;

pub struct TaskBoard {
    repo: Arc<dyn TaskRepository>,
    tasks: Vec<Task>,
    /// Status a task had before this board toggled it to done
    before_done: HashMap<Id, TaskStatus>,
    loading: bool,
    error: Option<String>,
}

impl TaskBoard {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self {
            repo,
            tasks: Vec::new(),
            before_done: HashMap::new(),
            loading: false,
            error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: Id) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn with_status(&self, status: TaskStatus) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.status == status)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the list with the server's
    ///
    /// Remembered pre-done statuses are dropped; the server's copy wins.
    pub async fn load(&mut self) -> ClientResult<()> {
        self.loading = true;
        let result = self.repo.list().await;
        self.loading = false;

        let tasks = self.record(result)?;
        self.tasks = tasks;
        self.before_done.clear();
        Ok(())
    }

    pub async fn create(&mut self, draft: &TaskDraft) -> ClientResult<Task> {
        let result = self.repo.create(draft).await;
        let task = self.record(result)?;
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Save an edit; a status change forgets the remembered pre-done status
    pub async fn update(&mut self, id: Id, draft: &TaskDraft) -> ClientResult<Task> {
        let result = self.repo.update(id, draft).await;
        let task = self.record(result)?;

        let previous = self.get(id).map(|t| t.status);
        if previous != Some(task.status) {
            self.before_done.remove(&id);
        }
        self.replace(task.clone());
        Ok(task)
    }

    pub async fn delete(&mut self, id: Id) -> ClientResult<()> {
        let result = self.repo.delete(id).await;
        self.record(result)?;
        self.tasks.retain(|t| t.id != id);
        self.before_done.remove(&id);
        Ok(())
    }

    /// Flip a task between done and not done
    ///
    /// A task taken to done and back returns to the status it had before,
    /// `in_progress` included; otherwise leaving done means `todo`.
    pub async fn toggle(&mut self, id: Id) -> ClientResult<Task> {
        let current = self
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::InvalidInput(format!("task {} is not on the board", id)))?;

        let next = if current.is_done() {
            self.before_done
                .get(&id)
                .copied()
                .unwrap_or_else(|| current.status.toggled())
        } else {
            TaskStatus::Done
        };

        let draft = current.to_draft().status(next);
        let result = self.repo.update(id, &draft).await;
        let task = self.record(result)?;

        if next == TaskStatus::Done {
            self.before_done.insert(id, current.status);
        } else {
            self.before_done.remove(&id);
        }
        self.replace(task.clone());
        Ok(task)
    }

    fn replace(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.insert(0, task),
        }
    }

    /// Clear or store the error text of a finished call
    fn record<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        match result {
            Ok(value) => {
                self.error = None;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Task board call failed");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for TaskBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskBoard")
            .field("tasks", &self.tasks.len())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskPriority;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory repository that can be told to fail every call
    struct FakeRepo {
        tasks: Mutex<Vec<Task>>,
        next_id: Mutex<Id>,
        fail: AtomicBool,
    }

    impl FakeRepo {
        fn with(tasks: Vec<Task>) -> Arc<Self> {
            Arc::new(Self {
                tasks: Mutex::new(tasks),
                next_id: Mutex::new(100),
                fail: AtomicBool::new(false),
            })
        }

        fn check(&self) -> ClientResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 400,
                    message: "title: This field is required.".to_string(),
                });
            }
            Ok(())
        }

        fn build(id: Id, draft: &TaskDraft) -> Task {
            Task {
                id,
                title: draft.title.clone(),
                description: draft.description.clone(),
                status: draft.status,
                priority: draft.priority,
                due_date: draft.due_date,
                completed_at: None,
                created_at: None,
                updated_at: None,
            }
        }
    }

    #[async_trait]
    impl TaskRepository for FakeRepo {
        async fn list(&self) -> ClientResult<Vec<Task>> {
            self.check()?;
            Ok(self.tasks.lock().unwrap().clone())
        }

        async fn create(&self, draft: &TaskDraft) -> ClientResult<Task> {
            self.check()?;
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let task = Self::build(*next_id, draft);
            self.tasks.lock().unwrap().push(task.clone());
            Ok(task)
        }

        async fn update(&self, id: Id, draft: &TaskDraft) -> ClientResult<Task> {
            self.check()?;
            let task = Self::build(id, draft);
            let mut tasks = self.tasks.lock().unwrap();
            match tasks.iter_mut().find(|t| t.id == id) {
                Some(slot) => *slot = task.clone(),
                None => {
                    return Err(ClientError::Api {
                        status: 404,
                        message: "Not found.".to_string(),
                    })
                }
            }
            Ok(task)
        }

        async fn delete(&self, id: Id) -> ClientResult<()> {
            self.check()?;
            self.tasks.lock().unwrap().retain(|t| t.id != id);
            Ok(())
        }
    }

    fn task(id: Id, status: TaskStatus) -> Task {
        FakeRepo::build(id, &TaskDraft::new(format!("Task {}", id)).status(status))
    }

    async fn loaded(tasks: Vec<Task>) -> (Arc<FakeRepo>, TaskBoard) {
        let repo = FakeRepo::with(tasks);
        let mut board = TaskBoard::new(repo.clone());
        board.load().await.unwrap();
        (repo, board)
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_status() {
        for original in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            let (_repo, mut board) = loaded(vec![task(1, original)]).await;

            board.toggle(1).await.unwrap();
            let back = board.toggle(1).await.unwrap();
            assert_eq!(back.status, original);
            assert_eq!(board.get(1).unwrap().status, original);
        }
    }

    #[tokio::test]
    async fn test_toggle_done_goes_to_todo() {
        let (_repo, mut board) = loaded(vec![task(1, TaskStatus::Done)]).await;
        let toggled = board.toggle(1).await.unwrap();
        assert_eq!(toggled.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn test_toggle_keeps_other_fields() {
        let mut original = task(1, TaskStatus::InProgress);
        original.priority = TaskPriority::High;
        let (repo, mut board) = loaded(vec![original]).await;

        board.toggle(1).await.unwrap();
        let stored = repo.tasks.lock().unwrap()[0].clone();
        assert_eq!(stored.status, TaskStatus::Done);
        assert_eq!(stored.priority, TaskPriority::High);
        assert_eq!(stored.title, "Task 1");
    }

    #[tokio::test]
    async fn test_failed_mutations_leave_list_unchanged() {
        let (repo, mut board) =
            loaded(vec![task(1, TaskStatus::Todo), task(2, TaskStatus::InProgress)]).await;
        let before = board.tasks().to_vec();
        repo.fail.store(true, Ordering::SeqCst);

        assert!(board.create(&TaskDraft::new("New")).await.is_err());
        assert!(board.update(1, &TaskDraft::new("Renamed")).await.is_err());
        assert!(board.delete(2).await.is_err());
        assert!(board.toggle(1).await.is_err());
        assert!(board.load().await.is_err());

        assert_eq!(board.tasks(), before.as_slice());
        assert_eq!(board.error(), Some("title: This field is required."));
    }

    #[tokio::test]
    async fn test_failed_toggle_forgets_nothing() {
        let (repo, mut board) = loaded(vec![task(1, TaskStatus::InProgress)]).await;
        board.toggle(1).await.unwrap();

        repo.fail.store(true, Ordering::SeqCst);
        assert!(board.toggle(1).await.is_err());
        assert_eq!(board.get(1).unwrap().status, TaskStatus::Done);

        repo.fail.store(false, Ordering::SeqCst);
        assert_eq!(board.toggle(1).await.unwrap().status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_successful_mutations_apply_locally() {
        let (_repo, mut board) = loaded(vec![task(1, TaskStatus::Todo)]).await;

        let created = board.create(&TaskDraft::new("Write report")).await.unwrap();
        assert_eq!(board.tasks()[0].id, created.id);

        board
            .update(1, &TaskDraft::new("Renamed").status(TaskStatus::InProgress))
            .await
            .unwrap();
        assert_eq!(board.get(1).unwrap().title, "Renamed");
        assert_eq!(board.with_status(TaskStatus::InProgress).count(), 1);

        board.delete(1).await.unwrap();
        assert!(board.get(1).is_none());
        assert!(board.error().is_none());
    }

    #[tokio::test]
    async fn test_reload_forgets_pre_done_status() {
        let (repo, mut board) = loaded(vec![task(1, TaskStatus::InProgress)]).await;
        board.toggle(1).await.unwrap();

        board.load().await.unwrap();
        assert_eq!(board.toggle(1).await.unwrap().status, TaskStatus::Todo);
        assert_eq!(repo.tasks.lock().unwrap()[0].status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn test_status_edit_forgets_pre_done_status() {
        let (_repo, mut board) = loaded(vec![task(1, TaskStatus::InProgress)]).await;
        board.toggle(1).await.unwrap();

        // Reopened by hand, then completed again from the form
        board
            .update(1, &TaskDraft::new("Task 1").status(TaskStatus::Todo))
            .await
            .unwrap();
        board
            .update(1, &TaskDraft::new("Task 1").status(TaskStatus::Done))
            .await
            .unwrap();
        assert_eq!(board.toggle(1).await.unwrap().status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn test_edit_keeping_done_remembers_pre_done_status() {
        let (_repo, mut board) = loaded(vec![task(1, TaskStatus::InProgress)]).await;
        board.toggle(1).await.unwrap();

        board
            .update(1, &TaskDraft::new("Renamed").status(TaskStatus::Done))
            .await
            .unwrap();
        assert_eq!(board.toggle(1).await.unwrap().status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_toggle_unknown_task() {
        let (_repo, mut board) = loaded(vec![]).await;
        assert!(matches!(
            board.toggle(42).await,
            Err(ClientError::InvalidInput(_))
        ));
    }
}
