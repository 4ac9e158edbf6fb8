//! Schedule types: timetable entries and the schedule-generation API.
//!
//! The backend owns schedule *generation* entirely — the client only
//! starts a generation job, polls its status, and renders the resulting
//! assignments. What the client does decide is *visibility*: every
//! assignment carries a [`ParityTag`], and a biweekly lesson is shown
//! only in weeks whose computed [`WeekParity`] it admits. That one rule
//! lets a single lesson list represent an alternating curriculum without
//! duplicating entries.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Week parity
// ---------------------------------------------------------------------------

/// The parity of a teaching week. Alternates strictly week over week.
///
/// Computed by the calendar engine from a date and the teaching start;
/// never stored. Week index 0 is `Even` by convention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WeekParity {
    Odd,
    Even,
}

impl WeekParity {
    /// The opposite parity. Weeks alternate, so `flip` of week `n`
    /// is the parity of week `n + 1`.
    pub fn flip(self) -> Self {
        match self {
            Self::Odd => Self::Even,
            Self::Even => Self::Odd,
        }
    }
}

impl fmt::Display for WeekParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Odd => write!(f, "odd"),
            Self::Even => write!(f, "even"),
        }
    }
}

/// The biweekly tag on a lesson: run on odd weeks, even weeks, or every
/// week.
///
/// Older backend deployments serialize the every-week case as `"both"`;
/// newer ones as `"any"`. Both deserialize to [`ParityTag::Any`], and we
/// emit `"any"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ParityTag {
    Odd,
    Even,
    #[default]
    #[serde(alias = "both")]
    Any,
}

impl ParityTag {
    /// Whether a lesson with this tag is visible in a week with the
    /// given parity. This is the single decision point for biweekly
    /// filtering — if the week-0-is-even anchor ever becomes
    /// configurable, only callers of this method are affected.
    pub fn admits(self, week: WeekParity) -> bool {
        match self {
            Self::Any => true,
            Self::Odd => week == WeekParity::Odd,
            Self::Even => week == WeekParity::Even,
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule lifecycle
// ---------------------------------------------------------------------------

/// Backend-side lifecycle of a generated schedule.
///
/// `Pending` is the only non-terminal state; the generation poller runs
/// until the status leaves it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Pending,
    Generated,
    Failed,
    Archived,
}

impl ScheduleStatus {
    /// Returns `true` once the backend job has settled (any state
    /// other than `Pending`).
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Generated => write!(f, "generated"),
            Self::Failed => write!(f, "failed"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire DTOs (backend uses camelCase field names)
// ---------------------------------------------------------------------------

/// One timetable slot: a group meets a teacher in a room at a weekday
/// and time, possibly only on odd or even weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub schedule_id: String,
    pub group_id: String,
    #[serde(default)]
    pub group_name: Option<String>,
    pub course_id: String,
    #[serde(default)]
    pub course_name: Option<String>,
    pub teacher_id: String,
    #[serde(default)]
    pub teacher_name: Option<String>,
    pub room_id: String,
    #[serde(default)]
    pub room_name: Option<String>,

    /// ISO weekday, Monday-first: 1 = Monday ... 7 = Sunday.
    pub weekday: u8,

    /// Biweekly visibility tag.
    #[serde(default)]
    pub parity: ParityTag,

    /// Wall-clock times as `"HH:MM"` strings, exactly as the backend
    /// sends them. Kept opaque — the client never does time zone math
    /// on lesson times.
    pub start_time: String,
    pub end_time: String,

    #[serde(default)]
    pub subgroup: Option<u32>,
}

/// Schedule metadata as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub semester: Option<String>,
    pub is_active: bool,
    pub status: ScheduleStatus,
    #[serde(default)]
    pub version: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paged response of `GET /api/schedules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleList {
    pub items: Vec<ScheduleSummary>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Full schedule: metadata plus its assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetails {
    #[serde(flatten)]
    pub summary: ScheduleSummary,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// Request body of `POST /api/schedules/generate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lessons_per_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respect_preferences: Option<bool>,
}

/// Response of `POST /api/schedules/generate`: the job handle the
/// caller polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub schedule_id: String,
    pub status: ScheduleStatus,
    #[serde(default)]
    pub message: Option<String>,
}

/// A teacher's lessons within one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSchedule {
    pub teacher_id: String,
    pub schedule_id: String,
    pub lessons: Vec<Assignment>,
}

/// A student's lessons within one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSchedule {
    pub student_id: String,
    pub schedule_id: String,
    pub lessons: Vec<Assignment>,
}

// =========================================================================
// Tests
// =========================================================================
