//! Entry points called by the request layer.
//!
//! Every operation follows the same pipeline: look up the target (mutations
//! only, so a missing id always wins over a bad payload), validate, apply
//! temporal rules, run the cascade guard for schedule deletes, then persist.

mod schedules;
mod tasks;

#[cfg(test)]
mod tests;

use uuid::Uuid;

use crate::error::{EntityKind, Result, RotaError};

pub use schedules::ScheduleService;
pub use tasks::TaskService;

/// Result of a delete that may be softly refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing was removed; `message` explains why.
    Refused { message: String },
}

/// Parse a client-supplied id. Anything that is not a UUID cannot name a
/// stored record, so it is reported as not found.
pub fn parse_id(kind: EntityKind, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| RotaError::not_found(kind, raw))
}
