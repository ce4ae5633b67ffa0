//! Temporal rules: schedule windows must be ordered and tasks must sit inside
//! the window of the schedule that owns them.

use chrono::{DateTime, Duration, Utc};

use crate::config::IntervalPolicy;
use crate::entity::{Schedule, Task, TaskId};
use crate::error::{Result, RotaError};

/// Temporal checks parameterised by the configured [`IntervalPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalRules {
    policy: IntervalPolicy,
}

/// A task interval under consideration, `[start, start + duration)`.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    /// The task being updated, excluded from the sibling overlap scan.
    pub replacing: Option<TaskId>,
}

impl Candidate {
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }
}

impl TemporalRules {
    pub fn new(policy: IntervalPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> IntervalPolicy {
        self.policy
    }

    /// Whether task updates go through the containment checks used on creation.
    pub fn applies_on_update(&self) -> bool {
        self.policy.enforce_on_update
    }

    /// `start < end`, strictly.
    pub fn check_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
        if start < end {
            Ok(())
        } else {
            Err(RotaError::InvalidInterval("endTime must be after startTime".into()))
        }
    }

    /// The candidate must fit inside `schedule` and, unless overlap is allowed,
    /// must not intersect any of `siblings`.
    pub fn check_task(&self, schedule: &Schedule, siblings: &[Task], candidate: &Candidate) -> Result<()> {
        if !schedule.contains(candidate.start, candidate.end()) {
            return Err(RotaError::InvalidInterval(
                "Task must fall within the schedule's startTime and endTime".into(),
            ));
        }
        if self.policy.allow_task_overlap {
            return Ok(());
        }
        let clash = siblings
            .iter()
            .filter(|t| Some(t.id) != candidate.replacing)
            .any(|t| candidate.start < t.end_time() && t.start_time < candidate.end());
        if clash {
            return Err(RotaError::InvalidInterval(
                "Task overlaps another task in the same schedule".into(),
            ));
        }
        Ok(())
    }

    /// When narrowing revalidation is on, every existing task must still fit in
    /// the new `[start, end]` window.
    pub fn check_narrowing(&self, start: DateTime<Utc>, end: DateTime<Utc>, tasks: &[Task]) -> Result<()> {
        if !self.policy.revalidate_tasks_on_narrowing {
            return Ok(());
        }
        match tasks.iter().find(|t| t.start_time < start || t.end_time() > end) {
            Some(t) => Err(RotaError::InvalidInterval(format!(
                "Task {} would fall outside the schedule's new time window",
                t.id
            ))),
            None => Ok(()),
        }
    }
}
