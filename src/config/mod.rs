//! Configuration: connection descriptors and TOML settings.

mod connection;
mod settings;

pub use connection::{ConnectionDescriptor, ConnectionError, Driver};
pub use settings::{expand_env_vars, ConnectionSettings, QuerySettings, Settings, SettingsError};
