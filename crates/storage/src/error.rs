use thiserror::Error;

use rota_core::RotaError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshot { found: u32, expected: u32 },

    #[error("unknown storage backend: {0} (expected \"memory\" or \"file\")")]
    UnknownBackend(String),
}

impl From<StorageError> for RotaError {
    fn from(e: StorageError) -> Self {
        RotaError::Storage(e.to_string())
    }
}
