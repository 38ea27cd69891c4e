// lib/src/config/config_helpers.rs

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use log::{debug, info, warn};
use models::errors::{SchedulingError, SchedulingResult};

use crate::config::config_constants::*;
use crate::config::config_structs::AppConfig;

/// Loads the application configuration: defaults, then the YAML file, then
/// `SCHEDULER__*` environment variables. An explicitly given file must exist;
/// the default file is optional.
pub fn load_app_config(config_file_path: Option<&Path>) -> SchedulingResult<AppConfig> {
    load_app_config_with_prefix(config_file_path, ENV_PREFIX)
}

pub fn load_app_config_with_prefix(config_file_path: Option<&Path>, env_prefix: &str) -> SchedulingResult<AppConfig> {
    let path_to_use = config_file_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut builder = Config::builder();
    if path_to_use.exists() {
        info!("Loading configuration from {}", path_to_use.display());
        builder = builder.add_source(File::from(path_to_use.as_path()).format(FileFormat::Yaml));
    } else if config_file_path.is_some() {
        return Err(SchedulingError::Configuration(format!(
            "config file not found: {}",
            path_to_use.display()
        )));
    } else {
        warn!("Config file not found at {}. Using defaults and environment.", path_to_use.display());
    }

    builder = builder.add_source(environment_source(env_prefix));

    let config: AppConfig = builder
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| SchedulingError::Configuration(e.to_string()))?;

    config.validate()?;
    debug!("Loaded configuration: {:?}", config.redacted());
    Ok(config)
}

fn environment_source(prefix: &str) -> Environment {
    LIST_KEYS.iter().fold(
        Environment::with_prefix(prefix)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(ENV_LIST_SEPARATOR),
        |env, key| env.with_list_parse_key(key),
    )
}
