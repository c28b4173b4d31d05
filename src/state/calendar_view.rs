//! Calendar view state
//!
//! Navigation bumps a request generation and hands out a [`FetchTicket`].
//! The ticket is fetched (possibly concurrently with others) and the
//! outcome applied back; whether an outcome from an older generation may
//! overwrite newer data is decided by [`StalePolicy`].

use super::CalendarSource;
use crate::calendar::{build_grid, CalendarGrid, CalendarMonth, DayBuckets, WeekCursor};
use crate::client::ClientResult;
use crate::events::{Invalidation, ResourceKind};
use crate::model::{CalendarWindow, Schedule, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What to do with a result from a superseded request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Drop results older than the latest request
    #[default]
    Discard,
    /// Apply every result in arrival order
    Apply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Month,
    Week,
}

/// A pending fetch for one navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchTicket {
    pub async fn run(self, source: &dyn CalendarSource) -> FetchOutcome {
        let result = source.calendar_window(self.start, self.end).await;
        FetchOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// A finished fetch, ready to apply
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: ClientResult<CalendarWindow>,
}

/// Result of applying a fetch outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// Superseded by a newer request and discarded
    Stale,
    /// The request failed; previous data kept, message stored
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CalendarView {
    month: CalendarMonth,
    week: WeekCursor,
    mode: ViewMode,
    today: NaiveDate,
    policy: StalePolicy,
    schedules: Vec<Schedule>,
    tasks: Vec<Task>,
    buckets: DayBuckets,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl CalendarView {
    /// View on the month containing `today`
    pub fn new(today: NaiveDate, policy: StalePolicy) -> Self {
        Self {
            month: CalendarMonth::containing(today),
            week: WeekCursor::containing(today),
            mode: ViewMode::Month,
            today,
            policy,
            schedules: Vec::new(),
            tasks: Vec::new(),
            buckets: DayBuckets::default(),
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn month(&self) -> CalendarMonth {
        self.month
    }

    pub fn week(&self) -> WeekCursor {
        self.week
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn buckets(&self) -> &DayBuckets {
        &self.buckets
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Grid for the displayed month, recomputed on every call
    pub fn grid(&self) -> CalendarGrid {
        build_grid(self.month, self.today)
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// Request data for the displayed month
    pub fn refresh(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;

        let (start, end) = self.month.fetch_window();
        FetchTicket {
            generation: self.generation,
            start,
            end,
        }
    }

    pub fn go_to(&mut self, month: CalendarMonth) -> FetchTicket {
        self.month = month;
        if !month.contains(self.week.anchor()) {
            self.week = WeekCursor::containing(month.first_day());
        }
        self.refresh()
    }

    pub fn next_month(&mut self) -> FetchTicket {
        self.go_to(self.month.next())
    }

    pub fn prev_month(&mut self) -> FetchTicket {
        self.go_to(self.month.prev())
    }

    pub fn go_today(&mut self) -> FetchTicket {
        self.week = WeekCursor::containing(self.today);
        self.go_to(CalendarMonth::containing(self.today))
    }

    /// Jump to the week containing `date`; the month follows its anchor
    pub fn go_to_week(&mut self, date: NaiveDate) -> FetchTicket {
        self.week = WeekCursor::containing(date);
        self.month = self.week.month();
        self.refresh()
    }

    /// Step one week forward; fetches only when the displayed month changes
    pub fn next_week(&mut self) -> Option<FetchTicket> {
        self.move_week(self.week.next())
    }

    pub fn prev_week(&mut self) -> Option<FetchTicket> {
        self.move_week(self.week.prev())
    }

    fn move_week(&mut self, week: WeekCursor) -> Option<FetchTicket> {
        self.week = week;
        let month = week.month();
        if month == self.month {
            return None;
        }
        self.month = month;
        Some(self.refresh())
    }

    /// Reload ticket if the invalidated resource is shown on the calendar
    pub fn on_invalidation(&mut self, event: &Invalidation) -> Option<FetchTicket> {
        match event.kind {
            ResourceKind::Tasks | ResourceKind::Schedules | ResourceKind::Account => {
                Some(self.refresh())
            }
            _ => None,
        }
    }

    pub fn apply(&mut self, outcome: FetchOutcome) -> Applied {
        let is_latest = outcome.generation == self.generation;
        if !is_latest && self.policy == StalePolicy::Discard {
            tracing::debug!(
                generation = outcome.generation,
                current = self.generation,
                "Discarding stale calendar result"
            );
            return Applied::Stale;
        }

        if is_latest {
            self.loading = false;
        }

        match outcome.result {
            Ok(window) => {
                self.buckets = DayBuckets::from_window(&window);
                self.schedules = window.schedules;
                self.tasks = window.tasks;
                self.error = None;
                Applied::Updated
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "Calendar fetch failed");
                self.error = Some(message.clone());
                Applied::Failed(message)
            }
        }
    }

    /// Fetch and apply in one step
    pub async fn load(&mut self, source: &dyn CalendarSource) -> Applied {
        let ticket = self.refresh();
        let outcome = ticket.run(source).await;
        self.apply(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::events::Mutation;
    use crate::model::{ScheduleColor, TaskPriority, TaskStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(id: u64, on: NaiveDate) -> Schedule {
        Schedule {
            id,
            title: format!("Schedule {}", id),
            description: String::new(),
            date: on,
            start_time: None,
            end_time: None,
            is_all_day: true,
            color: ScheduleColor::Blue,
            location: String::new(),
            customer: None,
            customer_name: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn task(id: u64, due: NaiveDate) -> Task {
        Task {
            id,
            title: format!("Task {}", id),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: Some(due),
            completed_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn window(ids: &[u64], on: NaiveDate) -> CalendarWindow {
        CalendarWindow {
            schedules: ids.iter().map(|&id| schedule(id, on)).collect(),
            tasks: vec![],
        }
    }

    /// Records requested windows and answers with a fixed window
    struct FakeSource {
        answer: ClientResult<CalendarWindow>,
        requests: Mutex<Vec<(NaiveDate, NaiveDate)>>,
    }

    impl FakeSource {
        fn ok(window: CalendarWindow) -> Self {
            Self {
                answer: Ok(window),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err(ClientError::Api {
                    status: 500,
                    message: "Failed to load calendar data".to_string(),
                }),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CalendarSource for FakeSource {
        async fn calendar_window(
            &self,
            start: NaiveDate,
            end: NaiveDate,
        ) -> ClientResult<CalendarWindow> {
            self.requests.lock().unwrap().push((start, end));
            match &self.answer {
                Ok(window) => Ok(window.clone()),
                Err(ClientError::Api { status, message }) => Err(ClientError::Api {
                    status: *status,
                    message: message.clone(),
                }),
                Err(_) => Err(ClientError::Timeout),
            }
        }
    }

    fn outcome(generation: u64, result: ClientResult<CalendarWindow>) -> FetchOutcome {
        FetchOutcome { generation, result }
    }

    #[tokio::test]
    async fn test_load_fetches_surrounding_months() {
        let day = date(2024, 3, 12);
        let source = FakeSource::ok(CalendarWindow {
            schedules: vec![schedule(1, day)],
            tasks: vec![task(2, day)],
        });
        let mut view = CalendarView::new(date(2024, 3, 1), StalePolicy::Discard);

        assert_eq!(view.load(&source).await, Applied::Updated);
        assert_eq!(
            source.requests.lock().unwrap().as_slice(),
            &[(date(2024, 2, 1), date(2024, 4, 30))]
        );
        assert_eq!(view.buckets().count_on(day), 2);
        assert!(!view.is_loading());
        assert!(view.error().is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_data() {
        let day = date(2024, 3, 12);
        let mut view = CalendarView::new(day, StalePolicy::Discard);
        view.load(&FakeSource::ok(window(&[1, 2], day))).await;

        let applied = view.load(&FakeSource::failing()).await;
        assert_eq!(
            applied,
            Applied::Failed("Failed to load calendar data".to_string())
        );
        assert_eq!(view.schedules().len(), 2);
        assert_eq!(view.error(), Some("Failed to load calendar data"));
        assert!(!view.is_loading());
    }

    #[test]
    fn test_stale_result_discarded() {
        let day = date(2024, 3, 12);
        let mut view = CalendarView::new(day, StalePolicy::Discard);

        let first = view.next_month();
        let second = view.next_month();
        assert!(second.generation > first.generation);

        // Newer answer lands first, then the older one
        assert_eq!(
            view.apply(outcome(second.generation, Ok(window(&[2], day)))),
            Applied::Updated
        );
        assert_eq!(
            view.apply(outcome(first.generation, Ok(window(&[1], day)))),
            Applied::Stale
        );
        assert_eq!(view.schedules()[0].id, 2);
        assert!(!view.is_loading());
    }

    #[test]
    fn test_older_result_before_newer_is_discarded() {
        let day = date(2024, 3, 12);
        let mut view = CalendarView::new(day, StalePolicy::Discard);

        let first = view.refresh();
        let _second = view.refresh();

        assert_eq!(
            view.apply(outcome(first.generation, Ok(window(&[1], day)))),
            Applied::Stale
        );
        assert!(view.schedules().is_empty());
        assert!(view.is_loading());
    }

    #[test]
    fn test_apply_policy_takes_arrival_order() {
        let day = date(2024, 3, 12);
        let mut view = CalendarView::new(day, StalePolicy::Apply);

        let first = view.refresh();
        let second = view.refresh();

        view.apply(outcome(second.generation, Ok(window(&[2], day))));
        assert_eq!(
            view.apply(outcome(first.generation, Ok(window(&[1], day)))),
            Applied::Updated
        );
        assert_eq!(view.schedules()[0].id, 1);
    }

    #[test]
    fn test_month_navigation_tickets() {
        let mut view = CalendarView::new(date(2024, 1, 15), StalePolicy::default());

        let ticket = view.prev_month();
        assert_eq!(view.month(), CalendarMonth::new(2023, 12).unwrap());
        assert_eq!((ticket.start, ticket.end), (date(2023, 11, 1), date(2024, 1, 31)));

        let ticket = view.go_today();
        assert_eq!(view.month(), CalendarMonth::new(2024, 1).unwrap());
        assert_eq!(ticket.generation, 2);
        assert_eq!(view.grid().month, view.month());
    }

    #[test]
    fn test_week_navigation_moves_month() {
        let mut view = CalendarView::new(date(2024, 3, 20), StalePolicy::default());
        view.set_mode(ViewMode::Week);

        assert!(view.next_week().is_none());
        assert_eq!(view.month().month(), 3);

        let ticket = view.next_week().unwrap();
        assert_eq!(view.week().anchor(), date(2024, 4, 3));
        assert_eq!(view.month(), CalendarMonth::new(2024, 4).unwrap());
        assert_eq!(ticket.start, date(2024, 3, 1));
    }

    #[test]
    fn test_go_to_week_spanning_months() {
        let mut view = CalendarView::new(date(2024, 3, 20), StalePolicy::default());

        // Week of Sun Mar 31 - Sat Apr 6, anchored mid-week
        let ticket = view.go_to_week(date(2024, 4, 1));
        assert!(view.week().contains(date(2024, 3, 31)));
        assert_eq!(view.month(), view.week().month());
        assert_eq!(ticket.generation, 1);
        assert!(view.is_loading());
    }

    #[test]
    fn test_invalidation_triggers_reload() {
        let mut view = CalendarView::new(date(2024, 3, 20), StalePolicy::default());
        let event = |kind| Invalidation {
            kind,
            mutation: Mutation::Updated,
            id: None,
            version: 1,
        };

        assert!(view.on_invalidation(&event(ResourceKind::Tasks)).is_some());
        assert!(view.on_invalidation(&event(ResourceKind::Schedules)).is_some());
        assert!(view.on_invalidation(&event(ResourceKind::Expenses)).is_none());
        assert_eq!(view.generation(), 2);
    }
}
