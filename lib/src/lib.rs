// lib/src/lib.rs

//! Scheduling engine: configuration, identity and access, storage engines and
//! the services that run slot inventory, bookings, status changes, documental
//! reviews and reporting on top of them.

pub mod config;
pub mod database;
pub mod identity;
pub mod reporting;
pub mod review;
pub mod scheduling;
pub mod storage_engine;
pub mod util;

pub use config::{load_app_config, AppConfig, StorageEngineType};
pub use database::Database;
pub use storage_engine::{create_storage, InMemoryStorage, SchedulingStore};
pub use util::{Clock, FixedClock, SystemClock};
