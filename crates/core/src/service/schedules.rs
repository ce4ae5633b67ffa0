use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cascade::guard_schedule_delete;
use crate::config::IntervalPolicy;
use crate::entity::{Schedule, ScheduleWithTasks};
use crate::error::{EntityKind, Result, RotaError};
use crate::store::{SaveMode, ScheduleStore};
use crate::temporal::TemporalRules;
use crate::validation::{merge_payload, ScheduleDraft};

use super::{parse_id, DeleteOutcome};

/// Create, read, update and delete schedules.
pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
    rules: TemporalRules,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>, policy: IntervalPolicy) -> Self {
        Self {
            store,
            rules: TemporalRules::new(policy),
        }
    }

    /// Validate `payload` and store a new, empty schedule.
    pub async fn create(&self, payload: &Value) -> Result<ScheduleWithTasks> {
        let draft = ScheduleDraft::from_payload(payload)?;
        self.rules.check_window(draft.start_time, draft.end_time)?;

        let now = Utc::now();
        let schedule = Schedule {
            id: Uuid::new_v4(),
            account_id: draft.account_id,
            agent_id: draft.agent_id,
            start_time: draft.start_time,
            end_time: draft.end_time,
            created_at: now,
            updated_at: now,
        };
        let saved = self.store.save_schedule(schedule, SaveMode::Insert).await?;
        info!(
            schedule = %saved.id,
            account = saved.account_id,
            agent = saved.agent_id,
            "schedule created"
        );
        Ok(ScheduleWithTasks {
            schedule: saved,
            tasks: Vec::new(),
        })
    }

    pub async fn list(&self) -> Result<Vec<ScheduleWithTasks>> {
        let schedules = self.store.list_schedules().await?;
        let mut out = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            out.push(self.with_tasks(schedule).await?);
        }
        Ok(out)
    }

    pub async fn get(&self, id: &str) -> Result<ScheduleWithTasks> {
        let schedule = self.require(id).await?;
        self.with_tasks(schedule).await
    }

    /// Merge `payload` over the stored schedule, revalidate, and save.
    pub async fn update(&self, id: &str, payload: &Value) -> Result<ScheduleWithTasks> {
        let existing = self.require(id).await?;
        let merged = merge_payload(existing.as_payload(), payload)?;
        let draft = ScheduleDraft::from_payload(&merged)?;

        self.rules.check_window(draft.start_time, draft.end_time)?;

        let tasks = self.store.list_tasks_by_schedule(existing.id).await?;
        self.rules
            .check_narrowing(draft.start_time, draft.end_time, &tasks)?;

        let updated = Schedule {
            account_id: draft.account_id,
            agent_id: draft.agent_id,
            start_time: draft.start_time,
            end_time: draft.end_time,
            updated_at: Utc::now(),
            ..existing
        };
        let saved = self.store.save_schedule(updated, SaveMode::Replace).await?;
        info!(schedule = %saved.id, tasks = tasks.len(), "schedule updated");
        Ok(ScheduleWithTasks {
            schedule: saved,
            tasks,
        })
    }

    /// Delete a schedule, or softly refuse while tasks still reference it.
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        let existing = self.require(id).await?;
        match self.guarded_delete(&existing).await {
            Ok(()) => {
                info!(schedule = %existing.id, "schedule deleted");
                Ok(DeleteOutcome::Deleted)
            }
            Err(err @ RotaError::CascadeBlocked { .. }) => Ok(DeleteOutcome::Refused {
                message: err.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    async fn guarded_delete(&self, schedule: &Schedule) -> Result<()> {
        guard_schedule_delete(self.store.as_ref(), schedule.id).await?;
        self.store.delete_schedule(schedule.id).await
    }

    async fn with_tasks(&self, schedule: Schedule) -> Result<ScheduleWithTasks> {
        let tasks = self.store.list_tasks_by_schedule(schedule.id).await?;
        Ok(ScheduleWithTasks { schedule, tasks })
    }

    async fn require(&self, raw_id: &str) -> Result<Schedule> {
        let id = parse_id(EntityKind::Schedule, raw_id)?;
        match self.store.find_schedule(id).await? {
            Some(schedule) => Ok(schedule),
            None => {
                debug!(schedule = %id, "schedule lookup miss");
                Err(RotaError::not_found(EntityKind::Schedule, id))
            }
        }
    }
}
