//! Schedule endpoints and the generation polling loop.
//!
//! Schedule *generation* runs as an asynchronous job on the backend:
//! the client starts it, gets a `pending` handle back, and polls until
//! the status settles. The retry loop is bounded — a job that is still
//! pending after the attempt budget is surfaced as an explicit timeout,
//! the one error in this codebase that should reach the user as a
//! visible notification.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use lectern_model::{
    GenerationRequest, GenerationResponse, ScheduleDetails, ScheduleList,
    ScheduleStatus, StudentSchedule, TeacherSchedule,
};
use lectern_store::Store;
use reqwest::Method;

use crate::{ApiClient, ApiError};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filters for the schedule list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ScheduleListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<ScheduleStatus>,
}

/// Optional narrowing for per-teacher/per-student schedule fetches.
#[derive(Debug, Clone, Default)]
pub struct ScheduleWindow {
    /// A specific schedule version; the backend defaults to the active
    /// one.
    pub schedule_id: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

/// Retry budget for generation polling.
///
/// The defaults match what the dashboard has always used: 15 attempts,
/// 2 seconds apart, so a job gets half a minute before the timeout
/// notification. Tests use a zero delay to stay fast.
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            delay: Duration::from_secs(2),
        }
    }
}

/// Polls `fetch` until the schedule's status leaves `pending`, up to
/// the attempt budget.
///
/// Fetch errors abort immediately — only "still pending" is retried.
/// Generic so the loop is testable without HTTP; the client method
/// below supplies the real fetch.
pub async fn poll_until_generated<F, Fut>(
    mut fetch: F,
    opts: PollOptions,
) -> Result<ScheduleDetails, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ScheduleDetails, ApiError>>,
{
    for attempt in 1..=opts.max_attempts {
        let current = fetch().await?;
        if current.summary.status.is_settled() {
            tracing::debug!(
                attempt,
                status = %current.summary.status,
                "schedule generation settled"
            );
            return Ok(current);
        }
        tracing::trace!(attempt, "schedule still pending");
        tokio::time::sleep(opts.delay).await;
    }
    Err(ApiError::GenerationTimeout {
        attempts: opts.max_attempts,
    })
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

impl<S: Store> ApiClient<S> {
    /// Starts a schedule generation job.
    ///
    /// The backend runs generation asynchronously by default;
    /// `synchronous` forces the old blocking behavior
    /// (`?async=false`).
    pub async fn generate_schedule(
        &self,
        request: &GenerationRequest,
        synchronous: bool,
    ) -> Result<GenerationResponse, ApiError> {
        let path = if synchronous {
            "/api/schedules/generate?async=false"
        } else {
            "/api/schedules/generate"
        };
        self.post(path, request).await
    }

    /// Lists schedules (versions and archive), paged.
    pub async fn fetch_schedules(
        &self,
        query: &ScheduleListQuery,
    ) -> Result<ScheduleList, ApiError> {
        let mut url = self.url("/api/schedules")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(page) = query.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(page_size) = query.page_size {
                pairs.append_pair("pageSize", &page_size.to_string());
            }
            if let Some(status) = query.status {
                pairs.append_pair("status", &status.to_string());
            }
        }
        self.request_json(Method::GET, url, None::<&()>).await
    }

    /// Fetches one schedule's metadata, optionally without its
    /// assignments.
    pub async fn fetch_schedule(
        &self,
        schedule_id: &str,
        include_assignments: bool,
    ) -> Result<ScheduleDetails, ApiError> {
        let mut url =
            self.url(&format!("/api/schedules/{schedule_id}"))?;
        if !include_assignments {
            url.query_pairs_mut()
                .append_pair("includeAssignments", "false");
        }
        self.request_json(Method::GET, url, None::<&()>).await
    }

    /// A teacher's lessons in the active (or given) schedule.
    pub async fn fetch_teacher_schedule(
        &self,
        teacher_id: &str,
        window: &ScheduleWindow,
    ) -> Result<TeacherSchedule, ApiError> {
        let url = self.windowed_url(
            &format!("/api/schedules/teacher/{teacher_id}"),
            window,
        )?;
        self.request_json(Method::GET, url, None::<&()>).await
    }

    /// A student's lessons in the active (or given) schedule.
    pub async fn fetch_student_schedule(
        &self,
        student_id: &str,
        window: &ScheduleWindow,
    ) -> Result<StudentSchedule, ApiError> {
        let url = self.windowed_url(
            &format!("/api/schedules/student/{student_id}"),
            window,
        )?;
        self.request_json(Method::GET, url, None::<&()>).await
    }

    /// Polls the schedule until generation settles, with the given
    /// retry budget. See [`poll_until_generated`].
    pub async fn wait_for_generated(
        &self,
        schedule_id: &str,
        opts: PollOptions,
    ) -> Result<ScheduleDetails, ApiError> {
        poll_until_generated(
            || self.fetch_schedule(schedule_id, true),
            opts,
        )
        .await
    }

    fn windowed_url(
        &self,
        path: &str,
        window: &ScheduleWindow,
    ) -> Result<reqwest::Url, ApiError> {
        let mut url = self.url(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(schedule_id) = &window.schedule_id {
                pairs.append_pair("scheduleId", schedule_id);
            }
            if let Some(from) = window.from_date {
                pairs.append_pair("fromDate", &from.to_string());
            }
            if let Some(to) = window.to_date {
                pairs.append_pair("toDate", &to.to_string());
            }
        }
        Ok(url)
    }
}

// =========================================================================
// Tests
// =========================================================================
