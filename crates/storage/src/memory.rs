//! Process-memory backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rota_core::{Result, SaveMode, Schedule, ScheduleId, ScheduleStore, Task, TaskId};

use crate::tables::Tables;

/// In-memory store with `Arc<RwLock<_>>` for concurrent access.
///
/// Every write, including its referential re-check, runs under one write
/// guard, so a task can never be saved against a schedule deleted in between.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn find_schedule(&self, id: ScheduleId) -> Result<Option<Schedule>> {
        Ok(self.tables.read().await.schedule(id))
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        Ok(self.tables.read().await.schedules())
    }

    async fn save_schedule(&self, schedule: Schedule, mode: SaveMode) -> Result<Schedule> {
        self.tables.write().await.save_schedule(schedule, mode)
    }

    async fn delete_schedule(&self, id: ScheduleId) -> Result<()> {
        self.tables.write().await.delete_schedule(id)
    }

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.tables.read().await.task(id))
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tables.read().await.tasks())
    }

    async fn list_tasks_by_schedule(&self, schedule_id: ScheduleId) -> Result<Vec<Task>> {
        Ok(self.tables.read().await.tasks_for(schedule_id))
    }

    async fn save_task(&self, task: Task, mode: SaveMode) -> Result<Task> {
        self.tables.write().await.save_task(task, mode)
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.tables.write().await.delete_task(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rota_core::TaskType;
    use uuid::Uuid;

    fn schedule() -> Schedule {
        let start = Utc.with_ymd_and_hms(2023, 11, 30, 0, 0, 0).unwrap();
        Schedule {
            id: Uuid::new_v4(),
            account_id: 3,
            agent_id: 2,
            start_time: start,
            end_time: Utc.with_ymd_and_hms(2023, 12, 30, 0, 0, 0).unwrap(),
            created_at: start,
            updated_at: start,
        }
    }

    fn task(schedule_id: ScheduleId) -> Task {
        let start = Utc.with_ymd_and_hms(2023, 12, 1, 8, 0, 0).unwrap();
        Task {
            id: Uuid::new_v4(),
            account_id: 3,
            schedule_id,
            start_time: start,
            duration: 60,
            task_type: TaskType::Break,
            created_at: start,
            updated_at: start,
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = MemoryStore::new();
        let s = store.save_schedule(schedule(), SaveMode::Insert).await.unwrap();
        assert_eq!(store.find_schedule(s.id).await.unwrap(), Some(s.clone()));
        assert_eq!(store.list_schedules().await.unwrap().len(), 1);
        assert!(store.find_task(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tasks_filtered_by_schedule() {
        let store = MemoryStore::new();
        let a = store.save_schedule(schedule(), SaveMode::Insert).await.unwrap();
        let b = store.save_schedule(schedule(), SaveMode::Insert).await.unwrap();
        store.save_task(task(a.id), SaveMode::Insert).await.unwrap();
        store.save_task(task(b.id), SaveMode::Insert).await.unwrap();
        store.save_task(task(a.id), SaveMode::Insert).await.unwrap();

        assert_eq!(store.list_tasks().await.unwrap().len(), 3);
        assert_eq!(store.list_tasks_by_schedule(a.id).await.unwrap().len(), 2);
        assert_eq!(store.list_tasks_by_schedule(b.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_task_saves_never_orphan() {
        let store = MemoryStore::new();
        let s = store.save_schedule(schedule(), SaveMode::Insert).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            let sid = s.id;
            handles.push(tokio::spawn(async move {
                let _ = store.save_task(task(sid), SaveMode::Insert).await;
            }));
        }
        let deleter = {
            let store = store.clone();
            tokio::spawn(async move { store.delete_schedule(s.id).await })
        };
        for h in handles {
            h.await.unwrap();
        }
        let deleted = deleter.await.unwrap().is_ok();

        let remaining = store.list_tasks_by_schedule(s.id).await.unwrap();
        if deleted {
            assert!(remaining.is_empty());
            assert!(store.find_schedule(s.id).await.unwrap().is_none());
        } else {
            assert!(store.find_schedule(s.id).await.unwrap().is_some());
        }
    }
}
