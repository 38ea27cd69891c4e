// lib/src/config/config_constants.rs

pub const DEFAULT_CONFIG_FILE: &str = "scheduler_config.yaml";
pub const ENV_PREFIX: &str = "SCHEDULER";
pub const ENV_SEPARATOR: &str = "__";
pub const ENV_LIST_SEPARATOR: &str = ",";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_STAFF_DOMAIN: &str = "@maida.health";

pub const DEFAULT_DIRECTORY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DIRECTORY_PAGE_SIZE: u32 = 10;

/// Allow-list keys that accept comma-separated values from the environment.
pub const LIST_KEYS: [&str; 3] = [
    "access.admin_emails",
    "access.front_desk_emails",
    "access.client_emails",
];
