//! Lectern — the client core of a role-based academic scheduling
//! dashboard.
//!
//! Two engines make up the core, assembled here behind one facade:
//!
//! - the **academic calendar**: teaching weeks counted from the Monday
//!   of the week containing September 1, with strict odd/even parity
//!   alternation driving biweekly lesson visibility
//!   ([`lectern_calendar`], re-exported below);
//! - the **auth lifecycle**: a state machine that restores a cached
//!   session optimistically, reconciles it against the backend, and
//!   follows credential changes made by other instances sharing its
//!   store ([`lectern_auth`]).
//!
//! # Layers
//!
//! ```text
//! lectern            facade: config, assembly, unified errors
//!   ├── lectern-auth      session state machine
//!   ├── lectern-api       HTTP client, schedule endpoints, OAuth
//!   ├── lectern-calendar  teaching-week arithmetic (pure)
//!   ├── lectern-store     key-value storage + change events
//!   └── lectern-model     shared domain types
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use lectern::{Config, LecternBuilder, MemoryStore};
//!
//! # async fn run() -> Result<(), lectern::LecternError> {
//! let store = Arc::new(MemoryStore::new());
//! let mut app = LecternBuilder::new(Config::from_env(), store).build()?;
//! app.initialize().await;
//!
//! if let Some(user) = app.user() {
//!     println!("signed in as {}", user.name);
//! }
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;

pub use app::{Lectern, LecternBuilder, spawn_store_listener};
pub use config::Config;
pub use error::LecternError;

// The pieces hosts touch directly, re-exported so most programs only
// depend on `lectern`.
pub use lectern_api::{
    ApiClient, ApiError, OAuthConfig, OAuthRedirect, PollOptions,
    ScheduleListQuery, ScheduleWindow,
};
pub use lectern_auth::{
    AuthController, AuthError, AuthMode, AuthPhase, AuthSnapshot,
};
pub use lectern_calendar::{
    AcademicWeek, academic_year_start, format_week_range, monday_of,
    parity_of, teaching_start, visible_on, week_index,
    week_start_from_index,
};
pub use lectern_model::{
    Assignment, GenerationRequest, GenerationResponse, MeResponse,
    ParityTag, Role, ScheduleDetails, ScheduleList, ScheduleStatus,
    ScheduleSummary, StudentSchedule, TeacherSchedule, User, UserStatus,
    WeekParity,
};
pub use lectern_store::{
    FileStore, MemoryStore, Store, StoreError, StoreEvent, keys,
};

/// Installs the global tracing subscriber.
///
/// Filtering follows `RUST_LOG` when set, otherwise `info`. Safe to
/// call more than once; later calls are ignored.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
