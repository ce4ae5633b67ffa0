//! Guard against removing a schedule that tasks still point at.

use tracing::warn;

use crate::entity::ScheduleId;
use crate::error::{EntityKind, Result, RotaError};
use crate::store::ScheduleStore;

/// Fails with `CascadeBlocked` while any task references `schedule_id`.
pub async fn guard_schedule_delete(store: &dyn ScheduleStore, schedule_id: ScheduleId) -> Result<()> {
    let dependents = store.list_tasks_by_schedule(schedule_id).await?.len();
    if dependents > 0 {
        warn!(schedule = %schedule_id, dependents, "schedule delete refused: tasks still attached");
        return Err(RotaError::CascadeBlocked {
            kind: EntityKind::Schedule,
            id: schedule_id.to_string(),
            dependents,
        });
    }
    Ok(())
}
