pub mod error;
pub mod file;
pub mod memory;
mod tables;

use std::sync::Arc;

use tracing::info;

use rota_core::config::StorageConfig;
use rota_core::ScheduleStore;

pub use error::StorageError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Build the store selected by `STORAGE_BACKEND`.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn ScheduleStore>, StorageError> {
    match config.backend.as_str() {
        "memory" => {
            info!("Storage: in-memory backend (records are lost on restart)");
            Ok(Arc::new(MemoryStore::new()))
        }
        "file" => {
            let store = JsonFileStore::open(&config.data_dir)?;
            info!("Storage: file backend at {}", store.path().display());
            Ok(Arc::new(store))
        }
        other => Err(StorageError::UnknownBackend(other.to_string())),
    }
}
