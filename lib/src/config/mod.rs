// lib/src/config/mod.rs

pub mod config_constants;
pub mod config_helpers;
pub mod config_structs;

pub use config_constants::*;
pub use config_helpers::{load_app_config, load_app_config_with_prefix};
pub use config_structs::{
    AccessConfig, AppConfig, DirectoryConfig, PublicClientConfig, SchedulingConfig, ServerConfig,
    StaticToken, StorageConfig, StorageEngineType,
};
