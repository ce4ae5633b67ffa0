use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::IntervalPolicy;
use crate::entity::{Schedule, Task};
use crate::error::{EntityKind, Result, RotaError};
use crate::store::{SaveMode, ScheduleStore};
use crate::temporal::{Candidate, TemporalRules};
use crate::validation::{merge_payload, TaskDraft};

use super::parse_id;

/// Create, read, update and delete tasks.
pub struct TaskService {
    store: Arc<dyn ScheduleStore>,
    rules: TemporalRules,
}

impl TaskService {
    pub fn new(store: Arc<dyn ScheduleStore>, policy: IntervalPolicy) -> Self {
        Self {
            store,
            rules: TemporalRules::new(policy),
        }
    }

    /// Validate `payload`, resolve its schedule, and store the task.
    pub async fn create(&self, payload: &Value) -> Result<Task> {
        let draft = TaskDraft::from_payload(payload)?;
        let schedule = self.owning_schedule(&draft.schedule_id).await?;

        let siblings = self.overlap_candidates(&schedule).await?;
        let candidate = Candidate {
            start: draft.start_time,
            duration_minutes: draft.duration,
            replacing: None,
        };
        self.rules.check_task(&schedule, &siblings, &candidate)?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            account_id: draft.account_id,
            schedule_id: schedule.id,
            start_time: draft.start_time,
            duration: draft.duration,
            task_type: draft.task_type,
            created_at: now,
            updated_at: now,
        };
        let saved = self.store.save_task(task, SaveMode::Insert).await?;
        info!(
            task = %saved.id,
            schedule = %saved.schedule_id,
            kind = %saved.task_type,
            minutes = saved.duration,
            "task created"
        );
        Ok(saved)
    }

    /// All tasks, or only those of `schedule_id` when given.
    pub async fn list(&self, schedule_id: Option<&str>) -> Result<Vec<Task>> {
        match schedule_id {
            Some(raw) => {
                let schedule = self.owning_schedule(raw).await?;
                self.store.list_tasks_by_schedule(schedule.id).await
            }
            None => self.store.list_tasks().await,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Task> {
        self.require(id).await
    }

    /// Merge `payload` over the stored task, revalidate, and save.
    ///
    /// `scheduleId` may be repeated but not changed.
    pub async fn update(&self, id: &str, payload: &Value) -> Result<Task> {
        let existing = self.require(id).await?;
        if let Some(requested) = payload.get("scheduleId") {
            let same = requested
                .as_str()
                .and_then(|s| Uuid::parse_str(s.trim()).ok())
                == Some(existing.schedule_id);
            if !same {
                return Err(RotaError::ImmutableField("scheduleId"));
            }
        }

        let merged = merge_payload(existing.as_payload(), payload)?;
        let draft = TaskDraft::from_payload(&merged)?;

        if self.rules.applies_on_update() {
            let schedule = self.owning_schedule(&draft.schedule_id).await?;
            let siblings = self.overlap_candidates(&schedule).await?;
            let candidate = Candidate {
                start: draft.start_time,
                duration_minutes: draft.duration,
                replacing: Some(existing.id),
            };
            self.rules.check_task(&schedule, &siblings, &candidate)?;
        }

        let updated = Task {
            account_id: draft.account_id,
            start_time: draft.start_time,
            duration: draft.duration,
            task_type: draft.task_type,
            updated_at: Utc::now(),
            ..existing
        };
        let saved = self.store.save_task(updated, SaveMode::Replace).await?;
        info!(task = %saved.id, schedule = %saved.schedule_id, "task updated");
        Ok(saved)
    }

    /// Tasks can always be deleted; the schedule's task list shrinks with them.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let existing = self.require(id).await?;
        self.store.delete_task(existing.id).await?;
        info!(task = %existing.id, schedule = %existing.schedule_id, "task deleted");
        Ok(())
    }

    async fn owning_schedule(&self, raw_id: &str) -> Result<Schedule> {
        let id = parse_id(EntityKind::Schedule, raw_id)?;
        self.store
            .find_schedule(id)
            .await?
            .ok_or_else(|| RotaError::not_found(EntityKind::Schedule, id))
    }

    /// Siblings only matter when overlap is forbidden; skip the query otherwise.
    async fn overlap_candidates(&self, schedule: &Schedule) -> Result<Vec<Task>> {
        if self.rules.policy().allow_task_overlap {
            return Ok(Vec::new());
        }
        self.store.list_tasks_by_schedule(schedule.id).await
    }

    async fn require(&self, raw_id: &str) -> Result<Task> {
        let id = parse_id(EntityKind::Task, raw_id)?;
        match self.store.find_task(id).await? {
            Some(task) => Ok(task),
            None => {
                debug!(task = %id, "task lookup miss");
                Err(RotaError::not_found(EntityKind::Task, id))
            }
        }
    }
}
