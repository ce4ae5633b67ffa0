use thiserror::Error;

/// Which record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Schedule,
    Task,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Schedule => write!(f, "Schedule"),
            EntityKind::Task => write!(f, "Task"),
        }
    }
}

/// Message returned when a schedule still has tasks attached.
pub const CASCADE_REFUSAL: &str = "Delete the associated tasks first to delete the schedule";

/// Every failure the consistency layer can report.
///
/// `Display` is the client-facing `message`, so variants are worded for
/// end users rather than operators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RotaError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{}", enum_message(.field, .allowed))]
    InvalidEnum {
        field: &'static str,
        allowed: &'static [&'static str],
    },

    #[error("{0} cannot be changed")]
    ImmutableField(&'static str),

    #[error("Request body must be a JSON object")]
    MalformedPayload,

    #[error("{kind} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{}", CASCADE_REFUSAL)]
    CascadeBlocked {
        kind: EntityKind,
        id: String,
        dependents: usize,
    },

    #[error("{0}")]
    InvalidInterval(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T, E = RotaError> = std::result::Result<T, E>;

impl RotaError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        RotaError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RotaError::NotFound { .. })
    }

    /// True for failures caused by the request payload itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RotaError::MissingField(_)
                | RotaError::InvalidField { .. }
                | RotaError::InvalidEnum { .. }
                | RotaError::ImmutableField(_)
                | RotaError::MalformedPayload
                | RotaError::InvalidInterval(_)
        )
    }
}

/// "Type can either be 'work' or 'break'"
fn enum_message(field: &str, allowed: &[&str]) -> String {
    let mut chars = field.chars();
    let label = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    let quoted: Vec<String> = allowed.iter().map(|v| format!("'{}'", v)).collect();
    format!("{} can either be {}", label, quoted.join(" or "))
}
