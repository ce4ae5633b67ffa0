//! Persistence contract consumed by the schedule and task services.

use async_trait::async_trait;

use crate::entity::{Schedule, ScheduleId, Task, TaskId};
use crate::error::Result;

/// Whether a save creates a record or replaces one that must still exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Insert,
    /// Fails with `NotFound` if the record was deleted in the meantime.
    Replace,
}

/// Storage for schedules and tasks.
///
/// Implementations must re-check referential integrity inside the same
/// critical section as the write:
/// - `save_task` fails with `NotFound(Schedule)` if the owning schedule is gone
/// - a [`SaveMode::Replace`] save fails with `NotFound` if the record is gone
/// - `delete_schedule` fails with `CascadeBlocked` if any task references it
///
/// Services run their own checks first; these re-checks close the window
/// between a service's read and its write.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn find_schedule(&self, id: ScheduleId) -> Result<Option<Schedule>>;

    /// All schedules in creation order.
    async fn list_schedules(&self) -> Result<Vec<Schedule>>;

    async fn save_schedule(&self, schedule: Schedule, mode: SaveMode) -> Result<Schedule>;

    async fn delete_schedule(&self, id: ScheduleId) -> Result<()>;

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>>;

    /// All tasks in creation order.
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Tasks whose `schedule_id` is `schedule_id`, in creation order.
    async fn list_tasks_by_schedule(&self, schedule_id: ScheduleId) -> Result<Vec<Task>>;

    async fn save_task(&self, task: Task, mode: SaveMode) -> Result<Task>;

    async fn delete_task(&self, id: TaskId) -> Result<()>;
}
