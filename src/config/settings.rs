//! TOML-based configuration for daojoin.
//!
//! Supports a config file (daojoin.toml) with environment variable expansion
//! in connection strings.
//!
//! Example configuration:
//! ```toml
//! [connections.main]
//! driver = "sqlite"
//! connection_string = "${DATA_DIR}/app.db"
//!
//! [query]
//! pool_capacity = 16
//!
//! [mappings.person]
//! table = "person"
//! columns = [
//!   { property = "ID", column = "id", type = "integer", identity = true },
//!   { property = "Name", column = "name", type = "text" },
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::connection::{ConnectionDescriptor, Driver};
use crate::mapping::ClassMapping;
use crate::sql::query::DEFAULT_POOL_CAPACITY;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "DAOJOIN_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Mapping not found: {0}")]
    MappingNotFound(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named database connections.
    pub connections: HashMap<String, ConnectionSettings>,

    /// Query compilation settings.
    pub query: QuerySettings,

    /// Named class mappings.
    pub mappings: HashMap<String, ClassMapping>,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Database driver (sqlite, postgres, mysql, mssql, duckdb, oracle).
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,
}

impl ConnectionSettings {
    /// Get the driver type.
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        Driver::from_str(&self.driver)
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }

    /// Driver plus expanded connection string.
    pub fn descriptor(&self) -> Result<ConnectionDescriptor, SettingsError> {
        Ok(ConnectionDescriptor::new(
            self.driver_type()?,
            self.resolved_connection_string()?,
        ))
    }
}

/// Query compilation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Idle compiled-query buffers kept per data source.
    pub pool_capacity: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        if settings.query.pool_capacity == 0 {
            return Err(SettingsError::InvalidConfig(
                "query.pool_capacity must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `DAOJOIN_CONFIG`
    /// 2. `./daojoin.toml`
    /// 3. `~/.config/daojoin/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("daojoin.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("daojoin").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get a class mapping by name, ready to share between stores.
    pub fn mapping(&self, name: &str) -> Result<Arc<ClassMapping>, SettingsError> {
        self.mappings
            .get(name)
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| SettingsError::MappingNotFound(name.to_string()))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept as is.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            while let Some(ch) = chars.next_if(|&ch| ch != '}') {
                var_name.push(ch);
            }
            if chars.next_if_eq(&'}').is_none() {
                return Err(SettingsError::InvalidConfig(format!(
                    "Unterminated variable reference in '{}'",
                    s
                )));
            }
        } else {
            while let Some(ch) = chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
