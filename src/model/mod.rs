//! Domain types for the business desk backend
//!
//! These mirror the JSON documents exchanged with the REST API:
//! - `Task` / `TaskDraft`: to-do entries and their write payloads
//! - `Schedule` / `ScheduleDraft`: calendar events
//! - `Customer`, `Document`: customer records and attached files
//! - `Expense`, `RecurringExpense` and their settings types
//! - `User` and the account request/response bodies
//!
//! Read types are immutable snapshots: a re-fetch replaces them wholesale.

mod account;
mod customer;
mod expense;
mod schedule;
mod task;

pub use account::{
    AuthCheck, LoginRequest, LoginResponse, PasswordChange, PasswordChangeResponse,
    RegisterRequest, User, UserUpdate, UserUpdateResponse,
};
pub use customer::{
    BusinessCardUpload, Customer, CustomerDraft, CustomerSummary, Document, DocumentCategory,
    DocumentUpload,
};
pub use expense::{
    CategoryDraft, CategoryTotal, Expense, ExpenseCategory, ExpenseDraft, ExpenseFilter,
    ExpenseSummary, ExpenseType, ExpenseYearlySummary, Frequency, GenerateResult, MethodTotal,
    MonthTotal, PaymentMethod, PaymentMethodDraft, RecurringDraft, RecurringExpense,
};
pub use schedule::{CalendarWindow, DailyAgenda, Schedule, ScheduleColor, ScheduleDraft};
pub use task::{MonthStat, MonthlyTaskStats, Task, TaskDraft, TaskPriority, TaskStatus, YearlyTaskStats};

/// Identifier type used by every backend resource
pub type Id = u64;

/// Wire format for calendar dates (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date the way the backend expects it in query strings
pub fn format_date(date: chrono::NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
