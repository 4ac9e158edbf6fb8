//! Domain and wire types for the Lectern client core.
//!
//! This crate defines every type that crosses a boundary — meaning the
//! structures that are serialized to JSON, sent to (or received from) the
//! backend, or persisted in local storage:
//!
//! - **Identity** ([`User`], [`Role`], [`UserStatus`], [`MeResponse`]) —
//!   the authenticated principal and the identity-endpoint payload it is
//!   mapped from.
//! - **Schedule** ([`Assignment`], [`ParityTag`], [`WeekParity`],
//!   `Schedule*` DTOs) — timetable entries and the schedule-generation
//!   API surface.
//!
//! # Architecture
//!
//! The model layer sits below everything else. It doesn't know about
//! storage, HTTP, or the auth state machine — it only knows the shapes
//! of the data and how they map onto each other.
//!
//! ```text
//! HTTP (lectern-api) → Model (this crate) ← Auth (lectern-auth)
//! ```

mod schedule;
mod user;

pub use schedule::{
    Assignment, GenerationRequest, GenerationResponse, ParityTag,
    ScheduleDetails, ScheduleList, ScheduleStatus, ScheduleSummary,
    StudentSchedule, TeacherSchedule, WeekParity,
};
pub use user::{MeResponse, Role, User, UserStatus};
