// lib/src/storage_engine/mod.rs

use std::sync::Arc;

use log::info;
use models::errors::SchedulingResult;

use crate::config::{StorageConfig, StorageEngineType};

pub mod inmemory_storage;
pub mod storage_engine;
#[cfg(feature = "postgres-datastore")]
pub mod postgres_schema;
#[cfg(feature = "postgres-datastore")]
pub mod postgres_storage;

pub use inmemory_storage::InMemoryStorage;
pub use storage_engine::{DateFilter, SchedulingStore, SlotFilter};
#[cfg(feature = "postgres-datastore")]
pub use postgres_storage::PostgresStorage;

/// Returned when a slot delete is blocked by a booking.
pub const BOOKED_SLOT_MESSAGE: &str = "cannot delete: a booking exists for this slot";
/// Returned when the conditional claim on a slot affects nothing.
pub const UNAVAILABLE_SLOT_MESSAGE: &str = "slot unavailable or does not exist";
/// Returned when an override targets a time that already hosts a booking.
pub const OCCUPIED_SLOT_MESSAGE: &str = "a booking already exists at this time";

/// Opens the engine selected by `config.engine`. Schema creation is left to
/// the caller so `init-schema` and `serve` can share this path.
pub async fn create_storage(config: &StorageConfig) -> SchedulingResult<Arc<dyn SchedulingStore>> {
    info!("Creating storage engine: {}", config.engine);
    match config.engine {
        StorageEngineType::InMemory => Ok(Arc::new(InMemoryStorage::new())),
        #[cfg(feature = "postgres-datastore")]
        StorageEngineType::Postgres => {
            let storage = PostgresStorage::connect(config).await?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "postgres-datastore"))]
        StorageEngineType::Postgres => Err(models::errors::SchedulingError::Configuration(
            "postgres engine requested but the postgres-datastore feature is disabled".to_string(),
        )),
    }
}
