//! Academic calendar engine: turn a wall-clock date into scheduling
//! coordinates.
//!
//! Everything here is a pure function over [`chrono::NaiveDate`] — no
//! state, no I/O, safe to call from rendering code. The engine answers
//! three questions the timetable pages keep asking:
//!
//! 1. When did teaching start this academic year? ([`teaching_start`])
//! 2. Which teaching week is a given date in? ([`week_index`])
//! 3. Is that an odd or an even week? ([`parity_of`])
//!
//! The parity answer drives biweekly filtering: a lesson tagged
//! odd/even/any is visible in a week iff its tag admits the week's
//! parity ([`visible_on`]).
//!
//! # Conventions
//!
//! - Weeks run Monday through Sunday, Monday-first (`1 = Monday`).
//! - The academic year starts on September 1; week index 0 begins on
//!   the Monday of the week containing September 1.
//! - Week index 0 is **even**. This anchor is a fixed convention of the
//!   curriculum, not a configuration point; the one place it would be
//!   revisited is `ParityTag::admits` in `lectern-model`.
//! - `NaiveDate` carries no time of day, so every comparison is already
//!   midnight-normalized: a Monday belongs to its own week, never the
//!   previous one.

use chrono::{Datelike, Days, NaiveDate};
use lectern_model::{Assignment, WeekParity};

// ---------------------------------------------------------------------------
// Year boundary and teaching start
// ---------------------------------------------------------------------------

/// September 1 of the academic year containing `reference`.
///
/// Dates from September onward belong to the academic year that started
/// that September; January through August belong to the year that
/// started the previous September.
pub fn academic_year_start(reference: NaiveDate) -> NaiveDate {
    let year = if reference.month() >= 9 {
        reference.year()
    } else {
        reference.year() - 1
    };
    // September 1 exists in every year, so the construction cannot fail.
    NaiveDate::from_ymd_opt(year, 9, 1).expect("September 1 is always valid")
}

/// The first teaching Monday of the academic year containing
/// `reference`: the Monday of the week that holds September 1.
///
/// If September 1 falls on a Sunday this steps back six days to the
/// preceding Monday; any other weekday steps back `weekday - 1` days.
/// Both cases collapse into the same Monday-first arithmetic.
pub fn teaching_start(reference: NaiveDate) -> NaiveDate {
    monday_of(academic_year_start(reference))
}

/// The Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

// ---------------------------------------------------------------------------
// Week index and parity
// ---------------------------------------------------------------------------

/// Number of whole weeks between the Monday of `teaching_start`'s week
/// and the Monday of `date`'s week.
///
/// 0 for any date in the first teaching week, 1 for the next, and so
/// on. Stable across a week: every date Monday through Sunday yields
/// the same index. Dates before the teaching start produce negative
/// indices (floor division, so the week just before week 0 is -1).
pub fn week_index(date: NaiveDate, teaching_start: NaiveDate) -> i64 {
    let days = monday_of(date)
        .signed_duration_since(monday_of(teaching_start))
        .num_days();
    days.div_euclid(7)
}

/// The parity of the teaching week containing `date`.
///
/// Even week indices (including 0 and negatives that are multiples of
/// 2) are [`WeekParity::Even`]; the rest are odd. Week 0 being even is
/// the fixed anchor the whole biweekly curriculum hangs on.
pub fn parity_of(date: NaiveDate, teaching_start: NaiveDate) -> WeekParity {
    if week_index(date, teaching_start).rem_euclid(2) == 0 {
        WeekParity::Even
    } else {
        WeekParity::Odd
    }
}

/// The Monday that begins the week at `index`, counted from the
/// Monday of `teaching_start`'s week.
pub fn week_start_from_index(teaching_start: NaiveDate, index: i64) -> NaiveDate {
    monday_of(teaching_start) + chrono::Duration::days(index * 7)
}

/// Human-readable Monday–Sunday label for the week starting at
/// `week_start`, e.g. `"02.09 - 08.09"`.
pub fn format_week_range(week_start: NaiveDate) -> String {
    let sunday = week_start + Days::new(6);
    format!(
        "{} - {}",
        week_start.format("%d.%m"),
        sunday.format("%d.%m")
    )
}

// ---------------------------------------------------------------------------
// AcademicWeek — the bundled answer
// ---------------------------------------------------------------------------

/// Scheduling coordinates of one teaching week: index, parity, and its
/// Monday-to-Sunday span. Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcademicWeek {
    /// 0-based count of weeks since the teaching start.
    pub index: i64,
    /// Odd or even, alternating strictly by week.
    pub parity: WeekParity,
    /// Monday of this week.
    pub start: NaiveDate,
    /// Sunday of this week.
    pub end: NaiveDate,
}

impl AcademicWeek {
    /// Coordinates of the week containing `date`, measured against an
    /// explicit teaching start.
    pub fn for_date(date: NaiveDate, teaching_start: NaiveDate) -> Self {
        let index = week_index(date, teaching_start);
        let start = week_start_from_index(teaching_start, index);
        Self {
            index,
            parity: parity_of(date, teaching_start),
            start,
            end: start + Days::new(6),
        }
    }

    /// Coordinates of the week containing `date`, with the teaching
    /// start derived from `date` itself. This is what the dashboard
    /// calls with "today".
    pub fn current(date: NaiveDate) -> Self {
        Self::for_date(date, teaching_start(date))
    }

    /// The week `n` steps after this one (negative `n` steps back).
    pub fn offset(&self, n: i64) -> Self {
        let start = self.start + chrono::Duration::days(n * 7);
        let parity = if n.rem_euclid(2) == 0 {
            self.parity
        } else {
            self.parity.flip()
        };
        Self {
            index: self.index + n,
            parity,
            start,
            end: start + Days::new(6),
        }
    }

    /// Monday–Sunday label for this week.
    pub fn label(&self) -> String {
        format_week_range(self.start)
    }
}

// ---------------------------------------------------------------------------
// Biweekly filtering
// ---------------------------------------------------------------------------

/// Lessons from `lessons` that are visible in a week with parity
/// `week`: those tagged `any`, plus those whose odd/even tag matches.
pub fn visible_on(
    lessons: &[Assignment],
    week: WeekParity,
) -> impl Iterator<Item = &Assignment> {
    lessons.iter().filter(move |lesson| lesson.parity.admits(week))
}

// =========================================================================
// Tests
// =========================================================================
