//! # Bizdesk
//!
//! Client library and terminal front end for a small-business desk backend:
//! tasks, schedules, customers with their documents, and expenses.
//!
//! ## Features
//!
//! - **Typed HTTP client**: token auth, uniform error messages, multipart uploads
//! - **Persistent session**: the auth token survives restarts
//! - **Calendar engine**: Sunday-start month grids, week cursors, per-day buckets
//! - **Change notifications**: mutations publish invalidations to dependent views
//! - **View state**: calendar, task board and dashboard models over async sources
//!
//! ## Modules
//!
//! - [`client`]: REST client for every backend resource
//! - [`session`]: Auth token persistence and session state
//! - [`calendar`]: Month/week arithmetic and text rendering
//! - [`state`]: View models fed by the client
//! - [`events`]: Invalidation bus
//! - [`model`]: Wire types and drafts
//! - [`config`]: TOML config with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bizdesk::calendar::{self, CalendarMonth};
//! use bizdesk::client::{ApiClient, ClientConfig};
//! use bizdesk::session::Session;
//! use bizdesk::state::{CalendarView, StalePolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(ClientConfig::default(), Session::in_memory())?;
//!     client.login("alice", "secret").await?;
//!
//!     // Load March 2024 with its neighbouring months
//!     let mut view = CalendarView::new(calendar::today(), StalePolicy::Discard);
//!     let ticket = view.go_to(CalendarMonth::new(2024, 3)?);
//!     view.apply(ticket.run(&client).await);
//!
//!     println!("{}", calendar::render_month(&view.grid(), view.buckets(), 2));
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod client;
pub mod config;
pub mod events;
pub mod model;
pub mod session;
pub mod state;

// Re-export top-level types for convenience
pub use calendar::{CalendarError, CalendarGrid, CalendarMonth, DayBuckets, WeekCursor};

pub use client::{ApiClient, ClientConfig, ClientError, ClientResult};

pub use config::{Config, ConfigError};

pub use events::{Invalidation, InvalidationBus, Mutation, ResourceKind};

pub use session::{AuthState, FileTokenStore, MemoryTokenStore, Session, SessionError, TokenStore};

pub use state::{
    Applied, CalendarSource, CalendarView, Dashboard, DashboardPart, DashboardSource,
    StalePolicy, TaskBoard, TaskRepository, ViewMode,
};
