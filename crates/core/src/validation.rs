//! Required-field and shape validation for incoming schedule/task payloads.
//!
//! Each entity has a fixed, ordered table of [`FieldRule`]s. Validation runs
//! two short-circuiting passes over the table:
//!
//! 1. presence: the first absent (or `null`) field yields `"<field> is required"`
//! 2. shape: the first present field with the wrong type or value is reported
//!
//! so a missing field is always reported ahead of a malformed one, and the
//! `type` enum is only checked once every required field is known to exist.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::entity::TaskType;
use crate::error::{Result, RotaError};

/// One required field and the check its value must pass.
pub struct FieldRule {
    pub field: &'static str,
    pub check: fn(&'static str, &Value) -> Result<()>,
}

pub const SCHEDULE_RULES: &[FieldRule] = &[
    FieldRule { field: "accountId", check: integer },
    FieldRule { field: "agentId", check: integer },
    FieldRule { field: "startTime", check: timestamp },
    FieldRule { field: "endTime", check: timestamp },
];

pub const TASK_RULES: &[FieldRule] = &[
    FieldRule { field: "accountId", check: integer },
    FieldRule { field: "scheduleId", check: identifier },
    FieldRule { field: "startTime", check: timestamp },
    FieldRule { field: "duration", check: positive_minutes },
    FieldRule { field: "type", check: task_type },
];

/// Run `rules` against `payload` in order.
pub fn check_fields(payload: &Value, rules: &[FieldRule]) -> Result<()> {
    let obj = as_object(payload)?;
    for rule in rules {
        if !is_present(obj, rule.field) {
            return Err(RotaError::MissingField(rule.field));
        }
    }
    for rule in rules {
        (rule.check)(rule.field, &obj[rule.field])?;
    }
    Ok(())
}

// ── Normalized drafts ─────────────────────────────────────────

/// A schedule payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDraft {
    pub account_id: i64,
    pub agent_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ScheduleDraft {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        check_fields(payload, SCHEDULE_RULES)?;
        Ok(Self {
            account_id: read_i64(payload, "accountId")?,
            agent_id: read_i64(payload, "agentId")?,
            start_time: read_timestamp(payload, "startTime")?,
            end_time: read_timestamp(payload, "endTime")?,
        })
    }
}

/// A task payload that passed validation. `schedule_id` is kept raw; resolving
/// it to a live schedule is the task service's job.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub account_id: i64,
    pub schedule_id: String,
    pub start_time: DateTime<Utc>,
    pub duration: u32,
    pub task_type: TaskType,
}

impl TaskDraft {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        check_fields(payload, TASK_RULES)?;
        let task_type = payload["type"]
            .as_str()
            .and_then(TaskType::parse)
            .ok_or(RotaError::InvalidEnum { field: "type", allowed: TaskType::ALLOWED })?;
        let duration = payload["duration"]
            .as_u64()
            .and_then(|d| u32::try_from(d).ok())
            .ok_or(RotaError::InvalidField { field: "duration", expected: "a positive integer" })?;
        Ok(Self {
            account_id: read_i64(payload, "accountId")?,
            schedule_id: payload["scheduleId"].as_str().unwrap_or_default().to_string(),
            start_time: read_timestamp(payload, "startTime")?,
            duration,
            task_type,
        })
    }
}

/// Overlay the keys of `patch` onto `base`. Both must be JSON objects.
pub fn merge_payload(mut base: Value, patch: &Value) -> Result<Value> {
    let patch = as_object(patch)?;
    if let Value::Object(ref mut target) = base {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    Ok(base)
}

// ── Timestamps ────────────────────────────────────────────────

/// Parse RFC 3339, a naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` (UTC), or a bare date
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ── Field checks ──────────────────────────────────────────────

fn integer(field: &'static str, value: &Value) -> Result<()> {
    match value.as_i64() {
        Some(_) => Ok(()),
        None => Err(RotaError::InvalidField { field, expected: "an integer" }),
    }
}

fn positive_minutes(field: &'static str, value: &Value) -> Result<()> {
    match value.as_u64() {
        Some(n) if n > 0 && n <= u64::from(u32::MAX) => Ok(()),
        _ => Err(RotaError::InvalidField { field, expected: "a positive integer" }),
    }
}

fn timestamp(field: &'static str, value: &Value) -> Result<()> {
    match value.as_str().and_then(parse_timestamp) {
        Some(_) => Ok(()),
        None => Err(RotaError::InvalidField { field, expected: "a valid timestamp" }),
    }
}

fn identifier(field: &'static str, value: &Value) -> Result<()> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(RotaError::InvalidField { field, expected: "a string identifier" }),
    }
}

fn task_type(field: &'static str, value: &Value) -> Result<()> {
    match value.as_str().and_then(TaskType::parse) {
        Some(_) => Ok(()),
        None => Err(RotaError::InvalidEnum { field, allowed: TaskType::ALLOWED }),
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn as_object(payload: &Value) -> Result<&Map<String, Value>> {
    payload.as_object().ok_or(RotaError::MalformedPayload)
}

fn is_present(obj: &Map<String, Value>, field: &str) -> bool {
    !matches!(obj.get(field), None | Some(Value::Null))
}

fn read_i64(payload: &Value, field: &'static str) -> Result<i64> {
    payload[field]
        .as_i64()
        .ok_or(RotaError::InvalidField { field, expected: "an integer" })
}

fn read_timestamp(payload: &Value, field: &'static str) -> Result<DateTime<Utc>> {
    payload[field]
        .as_str()
        .and_then(parse_timestamp)
        .ok_or(RotaError::InvalidField { field, expected: "a valid timestamp" })
}
