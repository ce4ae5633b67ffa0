//! JSON snapshot backend: in-memory tables written back to
//! `{DATA_DIR}/schedules.json` after every successful mutation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use rota_core::{Result, SaveMode, Schedule, ScheduleId, ScheduleStore, Task, TaskId};

use crate::error::StorageError;
use crate::tables::{Snapshot, Tables, SNAPSHOT_VERSION};

const SNAPSHOT_FILE: &str = "schedules.json";

pub struct JsonFileStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl JsonFileStore {
    /// Open (or create) the snapshot under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(SNAPSHOT_FILE);
        let tables = if path.exists() {
            let raw = std::fs::read(&path)?;
            let snapshot: Snapshot = serde_json::from_slice(&raw)?;
            if snapshot.version != SNAPSHOT_VERSION {
                return Err(StorageError::UnsupportedSnapshot {
                    found: snapshot.version,
                    expected: SNAPSHOT_VERSION,
                });
            }
            Tables::from_snapshot(snapshot)
        } else {
            Tables::default()
        };
        let (schedules, tasks) = tables.counts();
        info!(path = %path.display(), schedules, tasks, "file store opened");
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `op` to a copy of the tables, persist the copy, then publish it.
    /// A failed write leaves both memory and disk untouched.
    async fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut Tables) -> Result<T> + Send,
    {
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        let out = op(&mut next)?;
        write_snapshot(&self.path, &next)?;
        *guard = next;
        Ok(out)
    }
}

fn write_snapshot(path: &Path, tables: &Tables) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(&tables.to_snapshot())?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl ScheduleStore for JsonFileStore {
    async fn find_schedule(&self, id: ScheduleId) -> Result<Option<Schedule>> {
        Ok(self.tables.read().await.schedule(id))
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        Ok(self.tables.read().await.schedules())
    }

    async fn save_schedule(&self, schedule: Schedule, mode: SaveMode) -> Result<Schedule> {
        self.mutate(move |t| t.save_schedule(schedule, mode)).await
    }

    async fn delete_schedule(&self, id: ScheduleId) -> Result<()> {
        self.mutate(move |t| t.delete_schedule(id)).await
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
        self.mutate(move |t| t.save_task(task, mode)).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.mutate(move |t| t.delete_task(id)).await
    }
}
