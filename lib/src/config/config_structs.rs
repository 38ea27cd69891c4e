// lib/src/config/config_structs.rs

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use models::errors::{SchedulingError, SchedulingResult};
use serde::{Deserialize, Serialize};

use crate::config::config_constants::*;

const REDACTED: &str = "<redacted>";

/// Root of the merged configuration (defaults, YAML file, environment, CLI).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub access: AccessConfig,
    pub directory: DirectoryConfig,
    pub scheduling: SchedulingConfig,
    pub public_client: PublicClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the external front end, served under `/` when set.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngineType {
    #[default]
    #[serde(alias = "in-memory", alias = "memory")]
    InMemory,
    #[serde(alias = "postgresql")]
    Postgres,
}

impl StorageEngineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageEngineType::InMemory => "inmemory",
            StorageEngineType::Postgres => "postgres",
        }
    }
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageEngineType {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inmemory" | "in-memory" | "memory" => Ok(StorageEngineType::InMemory),
            "postgres" | "postgresql" => Ok(StorageEngineType::Postgres),
            other => Err(SchedulingError::Configuration(format!("unknown storage engine '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub engine: StorageEngineType,
    pub connection_string: Option<String>,
    /// Create missing tables on startup.
    pub init_schema: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            engine: StorageEngineType::InMemory,
            connection_string: None,
            init_schema: true,
        }
    }
}

/// Role allow-lists. The three email lists must be disjoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub admin_emails: Vec<String>,
    pub front_desk_emails: Vec<String>,
    pub client_emails: Vec<String>,
    /// Principals whose email ends with this suffix are staff (call center).
    pub staff_domain: String,
    /// Bearer tokens accepted by the built-in static verifier.
    pub tokens: Vec<StaticToken>,
}

/// A bearer token and the principal it authenticates. Kept as a list rather
/// than a map so token case survives key normalisation in config sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticToken {
    pub token: String,
    pub email: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        AccessConfig {
            admin_emails: Vec::new(),
            front_desk_emails: Vec::new(),
            client_emails: Vec::new(),
            staff_domain: DEFAULT_STAFF_DOMAIN.to_string(),
            tokens: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub token_url: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: u64,
    pub page_size: u32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        DirectoryConfig {
            token_url: None,
            api_url: None,
            timeout_secs: DEFAULT_DIRECTORY_TIMEOUT_SECS,
            page_size: DEFAULT_DIRECTORY_PAGE_SIZE,
        }
    }
}

/// Public settings handed to the external login UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicClientConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Reject status changes that move a booking backwards in its lifecycle.
    pub strict_status_transitions: bool,
}

impl AppConfig {
    pub fn validate(&self) -> SchedulingResult<()> {
        self.access.validate()?;
        if self.storage.engine == StorageEngineType::Postgres
            && self.storage.connection_string.as_deref().map_or(true, |s| s.trim().is_empty())
        {
            return Err(SchedulingError::Configuration(
                "storage.connection_string is required for the postgres engine".to_string(),
            ));
        }
        if self.directory.page_size == 0 {
            return Err(SchedulingError::Configuration("directory.page_size must be positive".to_string()));
        }
        Ok(())
    }

    /// Copy safe to print: tokens and the connection string are masked.
    pub fn redacted(&self) -> AppConfig {
        let mut copy = self.clone();
        if copy.storage.connection_string.is_some() {
            copy.storage.connection_string = Some(REDACTED.to_string());
        }
        for entry in copy.access.tokens.iter_mut() {
            entry.token = REDACTED.to_string();
        }
        copy
    }
}

impl AccessConfig {
    pub fn validate(&self) -> SchedulingResult<()> {
        let lists = [
            ("admin_emails", &self.admin_emails),
            ("front_desk_emails", &self.front_desk_emails),
            ("client_emails", &self.client_emails),
        ];
        let mut seen: HashSet<String> = HashSet::new();
        for (name, list) in lists {
            for email in list {
                let normalized = email.trim().to_lowercase();
                if normalized.is_empty() {
                    continue;
                }
                if !seen.insert(normalized.clone()) {
                    return Err(SchedulingError::Configuration(format!(
                        "email '{}' in access.{} is already listed under another role",
                        normalized, name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.access.staff_domain, "@maida.health");
    }

    #[test]
    fn overlapping_allow_lists_are_rejected() {
        let mut config = AppConfig::default();
        config.access.admin_emails = vec!["boss@maida.health".to_string()];
        config.access.client_emails = vec!["BOSS@maida.health ".to_string()];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SchedulingError::Configuration(_)));
    }

    #[test]
    fn postgres_requires_connection_string() {
        let mut config = AppConfig::default();
        config.storage.engine = StorageEngineType::Postgres;
        assert!(config.validate().is_err());
        config.storage.connection_string = Some("postgres://localhost/agenda".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn redacted_hides_secrets() {
        let mut config = AppConfig::default();
        config.storage.connection_string = Some("postgres://user:pw@db/agenda".to_string());
        config.access.tokens.push(StaticToken {
            token: "secret-token".to_string(),
            email: "a@maida.health".to_string(),
        });
        let redacted = config.redacted();
        assert_eq!(redacted.storage.connection_string.as_deref(), Some(REDACTED));
        assert_eq!(redacted.access.tokens[0].token, REDACTED);
        assert_eq!(redacted.access.tokens[0].email, "a@maida.health");
    }

    #[test]
    fn engine_type_parses_aliases() {
        assert_eq!("PostgreSQL".parse::<StorageEngineType>().unwrap(), StorageEngineType::Postgres);
        assert_eq!("in-memory".parse::<StorageEngineType>().unwrap(), StorageEngineType::InMemory);
        assert!("sled".parse::<StorageEngineType>().is_err());
    }
}
