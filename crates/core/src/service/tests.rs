//! Service tests against a minimal in-process store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::cascade::guard_schedule_delete;
use crate::config::IntervalPolicy;
use crate::entity::{Schedule, ScheduleId, Task, TaskId};
use crate::error::{EntityKind, Result, RotaError, CASCADE_REFUSAL};
use crate::store::{SaveMode, ScheduleStore};

use super::{DeleteOutcome, ScheduleService, TaskService};

#[derive(Default)]
struct VecStore {
    schedules: Mutex<Vec<Schedule>>,
    tasks: Mutex<Vec<Task>>,
}

fn upsert<T: Clone>(items: &mut Vec<T>, item: T, found: Option<usize>, mode: SaveMode, kind: EntityKind, id: String) -> Result<T> {
    match (found, mode) {
        (Some(i), SaveMode::Replace) => items[i] = item.clone(),
        (None, SaveMode::Insert) => items.push(item.clone()),
        (None, SaveMode::Replace) => return Err(RotaError::not_found(kind, id)),
        (Some(_), SaveMode::Insert) => return Err(RotaError::Storage(format!("duplicate id {id}"))),
    }
    Ok(item)
}

#[async_trait]
impl ScheduleStore for VecStore {
    async fn find_schedule(&self, id: ScheduleId) -> Result<Option<Schedule>> {
        Ok(self.schedules.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        Ok(self.schedules.lock().unwrap().clone())
    }

    async fn save_schedule(&self, schedule: Schedule, mode: SaveMode) -> Result<Schedule> {
        let mut schedules = self.schedules.lock().unwrap();
        let found = schedules.iter().position(|s| s.id == schedule.id);
        let id = schedule.id.to_string();
        upsert(&mut schedules, schedule, found, mode, EntityKind::Schedule, id)
    }

    async fn delete_schedule(&self, id: ScheduleId) -> Result<()> {
        let tasks = self.tasks.lock().unwrap();
        let dependents = tasks.iter().filter(|t| t.schedule_id == id).count();
        if dependents > 0 {
            return Err(RotaError::CascadeBlocked { kind: EntityKind::Schedule, id: id.to_string(), dependents });
        }
        let mut schedules = self.schedules.lock().unwrap();
        let before = schedules.len();
        schedules.retain(|s| s.id != id);
        if schedules.len() == before {
            return Err(RotaError::not_found(EntityKind::Schedule, id));
        }
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.tasks.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn list_tasks_by_schedule(&self, schedule_id: ScheduleId) -> Result<Vec<Task>> {
        Ok(self.tasks.lock().unwrap().iter().filter(|t| t.schedule_id == schedule_id).cloned().collect())
    }

    async fn save_task(&self, task: Task, mode: SaveMode) -> Result<Task> {
        if !self.schedules.lock().unwrap().iter().any(|s| s.id == task.schedule_id) {
            return Err(RotaError::not_found(EntityKind::Schedule, task.schedule_id));
        }
        let mut tasks = self.tasks.lock().unwrap();
        let found = tasks.iter().position(|t| t.id == task.id);
        let id = task.id.to_string();
        upsert(&mut tasks, task, found, mode, EntityKind::Task, id)
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(RotaError::not_found(EntityKind::Task, id));
        }
        Ok(())
    }
}

fn services_with(policy: IntervalPolicy) -> (Arc<VecStore>, ScheduleService, TaskService) {
    let store = Arc::new(VecStore::default());
    let schedules = ScheduleService::new(store.clone(), policy);
    let tasks = TaskService::new(store.clone(), policy);
    (store, schedules, tasks)
}

fn services() -> (Arc<VecStore>, ScheduleService, TaskService) {
    services_with(IntervalPolicy::default())
}

fn schedule_body() -> Value {
    json!({
        "accountId": 3,
        "agentId": 2,
        "startTime": "2023-11-30",
        "endTime": "2023-12-30"
    })
}

fn task_body(schedule_id: &str) -> Value {
    json!({
        "accountId": 3,
        "scheduleId": schedule_id,
        "startTime": "2023-12-01T08:00",
        "duration": 120,
        "type": "break"
    })
}

#[tokio::test]
async fn create_then_get_schedule() {
    let (_store, schedules, _tasks) = services();
    let created = schedules.create(&schedule_body()).await.unwrap();
    assert!(created.tasks.is_empty());

    let fetched = schedules.get(&created.schedule.id.to_string()).await.unwrap();
    assert_eq!(fetched.schedule, created.schedule);
    assert_eq!(fetched.schedule.account_id, 3);
    assert_eq!(fetched.schedule.agent_id, 2);
}

#[tokio::test]
async fn schedule_end_must_follow_start() {
    let (_store, schedules, _tasks) = services();
    let mut body = schedule_body();
    body["endTime"] = json!("2023-11-30");
    let err = schedules.create(&body).await.unwrap_err();
    assert!(matches!(err, RotaError::InvalidInterval(_)));
}

#[tokio::test]
async fn task_appears_in_schedule_list() {
    let (_store, schedules, tasks) = services();
    let schedule = schedules.create(&schedule_body()).await.unwrap();
    let sid = schedule.schedule.id.to_string();

    let task = tasks.create(&task_body(&sid)).await.unwrap();
    let fetched = schedules.get(&sid).await.unwrap();
    assert_eq!(fetched.task_ids(), vec![task.id]);
}

#[tokio::test]
async fn task_list_keeps_creation_order() {
    let (_store, schedules, tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();

    let mut ids = Vec::new();
    for hour in ["2023-12-03T08:00", "2023-12-01T08:00", "2023-12-02T08:00"] {
        let mut body = task_body(&sid);
        body["startTime"] = json!(hour);
        ids.push(tasks.create(&body).await.unwrap().id);
    }
    assert_eq!(schedules.get(&sid).await.unwrap().task_ids(), ids);
    assert_eq!(tasks.list(Some(&sid)).await.unwrap().len(), 3);
}

#[tokio::test]
async fn task_for_unknown_schedule_is_not_found() {
    let (_store, _schedules, tasks) = services();
    let err = tasks
        .create(&task_body("0b7f2d7e-4c7a-4b8e-9d8e-2f3c4a5b6c7d"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Schedule not found");

    let err = tasks.create(&task_body("not-an-id")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn task_outside_schedule_rejected() {
    let (_store, schedules, tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    let mut body = task_body(&sid);
    body["startTime"] = json!("2023-12-29T23:00");
    let err = tasks.create(&body).await.unwrap_err();
    assert!(matches!(err, RotaError::InvalidInterval(_)));
}

#[tokio::test]
async fn delete_schedule_with_tasks_is_soft_refused() {
    let (_store, schedules, tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    let task = tasks.create(&task_body(&sid)).await.unwrap();

    let outcome = schedules.delete(&sid).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Refused { message: CASCADE_REFUSAL.to_string() });
    assert!(schedules.get(&sid).await.is_ok());

    tasks.delete(&task.id.to_string()).await.unwrap();
    assert_eq!(schedules.delete(&sid).await.unwrap(), DeleteOutcome::Deleted);
    assert!(schedules.get(&sid).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn cascade_guard_counts_dependents() {
    let (store, schedules, tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id;
    assert!(guard_schedule_delete(store.as_ref(), sid).await.is_ok());

    tasks.create(&task_body(&sid.to_string())).await.unwrap();
    tasks.create(&task_body(&sid.to_string())).await.unwrap();
    match guard_schedule_delete(store.as_ref(), sid).await {
        Err(RotaError::CascadeBlocked { dependents, .. }) => assert_eq!(dependents, 2),
        other => panic!("expected CascadeBlocked, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_ids_win_over_bad_payloads() {
    let (_store, schedules, tasks) = services();
    let ghost = "8a1e7c55-2d4b-4f0a-a1b2-c3d4e5f60718";

    let err = schedules.update(ghost, &json!({ "accountId": "nope" })).await.unwrap_err();
    assert_eq!(err.to_string(), "Schedule not found");
    assert!(schedules.delete(ghost).await.unwrap_err().is_not_found());

    let err = tasks.update(ghost, &json!({ "type": "nap" })).await.unwrap_err();
    assert_eq!(err.to_string(), "Task not found");
    assert!(tasks.delete(ghost).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn schedule_update_merges_fields() {
    let (_store, schedules, _tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();

    let updated = schedules
        .update(&sid, &json!({ "accountId": 10, "agentId": 24 }))
        .await
        .unwrap();
    assert_eq!(updated.schedule.account_id, 10);
    assert_eq!(updated.schedule.agent_id, 24);

    let err = schedules.update(&sid, &json!({ "endTime": null })).await.unwrap_err();
    assert_eq!(err.to_string(), "endTime is required");
}

#[tokio::test]
async fn task_update_revalidates_type() {
    let (_store, schedules, tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    let tid = tasks.create(&task_body(&sid)).await.unwrap().id.to_string();

    let updated = tasks
        .update(&tid, &json!({ "accountId": 4, "startTime": "2023-12-01T09:00:00.000Z", "duration": 180, "type": "break" }))
        .await
        .unwrap();
    assert_eq!(updated.account_id, 4);
    assert_eq!(updated.duration, 180);

    let err = tasks.update(&tid, &json!({ "type": "Updated Task Type" })).await.unwrap_err();
    assert!(matches!(err, RotaError::InvalidEnum { .. }));
}

#[tokio::test]
async fn task_cannot_move_between_schedules() {
    let (_store, schedules, tasks) = services();
    let first = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    let second = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    let tid = tasks.create(&task_body(&first)).await.unwrap().id.to_string();

    let err = tasks.update(&tid, &json!({ "scheduleId": second })).await.unwrap_err();
    assert_eq!(err, RotaError::ImmutableField("scheduleId"));
    // repeating the current owner is fine
    assert!(tasks.update(&tid, &json!({ "scheduleId": first })).await.is_ok());
}

#[tokio::test]
async fn narrowing_refused_when_policy_enabled() {
    let policy = IntervalPolicy { revalidate_tasks_on_narrowing: true, ..Default::default() };
    let (_store, schedules, tasks) = services_with(policy);
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    tasks.create(&task_body(&sid)).await.unwrap();

    let err = schedules.update(&sid, &json!({ "endTime": "2023-12-01T09:00" })).await.unwrap_err();
    assert!(matches!(err, RotaError::InvalidInterval(_)));
    assert!(schedules.update(&sid, &json!({ "endTime": "2023-12-02" })).await.is_ok());
}

#[tokio::test]
async fn narrowing_allowed_by_default() {
    let (_store, schedules, tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    tasks.create(&task_body(&sid)).await.unwrap();
    assert!(schedules.update(&sid, &json!({ "endTime": "2023-12-01T09:00" })).await.is_ok());
}

#[tokio::test]
async fn schedule_update_keeps_window_ordered() {
    let (_store, schedules, _tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();

    let err = schedules.update(&sid, &json!({ "endTime": "2023-11-30" })).await.unwrap_err();
    assert!(matches!(err, RotaError::InvalidInterval(_)));
    let stored = schedules.get(&sid).await.unwrap();
    assert!(stored.schedule.start_time < stored.schedule.end_time);
}

#[tokio::test]
async fn window_order_checked_even_without_update_enforcement() {
    let policy = IntervalPolicy { enforce_on_update: false, ..Default::default() };
    let (_store, schedules, _tasks) = services_with(policy);
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();

    let err = schedules.update(&sid, &json!({ "endTime": "2023-01-01" })).await.unwrap_err();
    assert!(matches!(err, RotaError::InvalidInterval(_)));
}

#[tokio::test]
async fn task_update_outside_schedule_rejected() {
    let (_store, schedules, tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    let tid = tasks.create(&task_body(&sid)).await.unwrap().id.to_string();

    let err = tasks
        .update(&tid, &json!({ "startTime": "2024-02-01T08:00" }))
        .await
        .unwrap_err();
    assert!(matches!(err, RotaError::InvalidInterval(_)));
    let stored = tasks.get(&tid).await.unwrap();
    assert_eq!(stored.start_time.to_rfc3339(), "2023-12-01T08:00:00+00:00");
}

#[tokio::test]
async fn task_containment_skipped_when_update_enforcement_off() {
    let policy = IntervalPolicy { enforce_on_update: false, ..Default::default() };
    let (_store, schedules, tasks) = services_with(policy);
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    let tid = tasks.create(&task_body(&sid)).await.unwrap().id.to_string();

    let moved = tasks
        .update(&tid, &json!({ "startTime": "2024-02-01T08:00" }))
        .await
        .unwrap();
    assert_eq!(moved.start_time.to_rfc3339(), "2024-02-01T08:00:00+00:00");

    // creation still enforces containment
    let mut body = task_body(&sid);
    body["startTime"] = json!("2024-02-01T08:00");
    assert!(tasks.create(&body).await.is_err());
}

#[tokio::test]
async fn overlap_policy_applies_to_siblings() {
    let policy = IntervalPolicy { allow_task_overlap: false, ..Default::default() };
    let (_store, schedules, tasks) = services_with(policy);
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id.to_string();
    let first = tasks.create(&task_body(&sid)).await.unwrap();

    let err = tasks.create(&task_body(&sid)).await.unwrap_err();
    assert!(matches!(err, RotaError::InvalidInterval(_)));

    // moving the existing task over its own old slot is not an overlap
    let moved = tasks
        .update(&first.id.to_string(), &json!({ "startTime": "2023-12-01T09:00" }))
        .await
        .unwrap();
    assert_eq!(moved.duration, 120);
}

#[tokio::test]
async fn store_rechecks_owner_before_saving_task() {
    let (store, schedules, tasks) = services();
    let sid = schedules.create(&schedule_body()).await.unwrap().schedule.id;
    let task = tasks.create(&task_body(&sid.to_string())).await.unwrap();
    store.tasks.lock().unwrap().clear();
    store.delete_schedule(sid).await.unwrap();

    let err = store.save_task(task, SaveMode::Insert).await.unwrap_err();
    assert_eq!(err.to_string(), "Schedule not found");
}
