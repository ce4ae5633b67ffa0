use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub type ScheduleId = Uuid;
pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Work,
    Break,
}

impl TaskType {
    /// Wire values accepted for the `type` field.
    pub const ALLOWED: &'static [&'static str] = &["work", "break"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "work" => Some(TaskType::Work),
            "break" => Some(TaskType::Break),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Work => "work",
            TaskType::Break => "break",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time window assigned to an agent of an account.
///
/// The schedule does not hold its tasks; they are looked up by
/// `Task::schedule_id` whenever a [`ScheduleWithTasks`] is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub account_id: i64,
    pub agent_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Whether `[start, end)` lies inside `[start_time, end_time]`.
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.start_time && end <= self.end_time
    }

    /// Editable fields in wire form, used as the base of a merge-update.
    pub fn as_payload(&self) -> Value {
        serde_json::json!({
            "accountId": self.account_id,
            "agentId": self.agent_id,
            "startTime": self.start_time.to_rfc3339(),
            "endTime": self.end_time.to_rfc3339(),
        })
    }
}

/// A typed sub-interval of a schedule. `duration` is in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub account_id: i64,
    pub schedule_id: ScheduleId,
    pub start_time: DateTime<Utc>,
    pub duration: u32,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration))
    }

    pub fn as_payload(&self) -> Value {
        serde_json::json!({
            "accountId": self.account_id,
            "scheduleId": self.schedule_id.to_string(),
            "startTime": self.start_time.to_rfc3339(),
            "duration": self.duration,
            "type": self.task_type.as_str(),
        })
    }
}

/// Response shape for schedules: the record plus its live task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWithTasks {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub tasks: Vec<Task>,
}

impl ScheduleWithTasks {
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }
}
