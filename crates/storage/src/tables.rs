//! The record tables shared by every backend, plus their integrity rules.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use rota_core::{
    EntityKind, Result, RotaError, SaveMode, Schedule, ScheduleId, Task, TaskId,
};

/// Schedules and tasks keyed by id, iterating in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    schedules: IndexMap<ScheduleId, Schedule>,
    tasks: IndexMap<TaskId, Task>,
}

/// On-disk form of [`Tables`].
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub schedules: Vec<Schedule>,
    pub tasks: Vec<Task>,
}

pub const SNAPSHOT_VERSION: u32 = 1;

impl Tables {
    pub fn schedule(&self, id: ScheduleId) -> Option<Schedule> {
        self.schedules.get(&id).cloned()
    }

    pub fn schedules(&self) -> Vec<Schedule> {
        self.schedules.values().cloned().collect()
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).cloned()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    pub fn tasks_for(&self, schedule_id: ScheduleId) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|t| t.schedule_id == schedule_id)
            .cloned()
            .collect()
    }

    pub fn save_schedule(&mut self, schedule: Schedule, mode: SaveMode) -> Result<Schedule> {
        let exists = self.schedules.contains_key(&schedule.id);
        check_mode(exists, mode, EntityKind::Schedule, schedule.id)?;
        self.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    pub fn delete_schedule(&mut self, id: ScheduleId) -> Result<()> {
        let dependents = self.tasks.values().filter(|t| t.schedule_id == id).count();
        if dependents > 0 {
            return Err(RotaError::CascadeBlocked {
                kind: EntityKind::Schedule,
                id: id.to_string(),
                dependents,
            });
        }
        self.schedules
            .shift_remove(&id)
            .map(|_| ())
            .ok_or_else(|| RotaError::not_found(EntityKind::Schedule, id))
    }

    pub fn save_task(&mut self, task: Task, mode: SaveMode) -> Result<Task> {
        if !self.schedules.contains_key(&task.schedule_id) {
            return Err(RotaError::not_found(EntityKind::Schedule, task.schedule_id));
        }
        let exists = self.tasks.contains_key(&task.id);
        check_mode(exists, mode, EntityKind::Task, task.id)?;
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.tasks
            .shift_remove(&id)
            .map(|_| ())
            .ok_or_else(|| RotaError::not_found(EntityKind::Task, id))
    }

    pub fn counts(&self) -> (usize, usize) {
        (self.schedules.len(), self.tasks.len())
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            schedules: self.schedules(),
            tasks: self.tasks(),
        }
    }

    /// Rebuild tables from a snapshot, dropping tasks whose schedule is missing.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let schedules: IndexMap<_, _> = snapshot
            .schedules
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let mut tasks = IndexMap::new();
        for task in snapshot.tasks {
            if schedules.contains_key(&task.schedule_id) {
                tasks.insert(task.id, task);
            } else {
                tracing::warn!(task = %task.id, schedule = %task.schedule_id, "dropping orphaned task from snapshot");
            }
        }
        Self { schedules, tasks }
    }
}

fn check_mode(exists: bool, mode: SaveMode, kind: EntityKind, id: impl std::fmt::Display) -> Result<()> {
    match (exists, mode) {
        (true, SaveMode::Insert) => Err(RotaError::Storage(format!("{} {} already exists", kind, id))),
        (false, SaveMode::Replace) => Err(RotaError::not_found(kind, id)),
        _ => Ok(()),
    }
}
