//! Database connection descriptors.
//!
//! Two stores can be joined natively only when their descriptors are equal:
//! same driver, same (expanded) connection string.

use std::fmt;

use crate::sql::dialect::Dialect;

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Unsupported driver: {0}. Supported: sqlite, postgres, mysql, mssql, duckdb, oracle")]
    UnsupportedDriver(String),
}

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    Sqlite,
    Postgres,
    MySql,
    /// Microsoft SQL Server
    MsSql,
    DuckDb,
    Oracle,
}

impl Driver {
    /// Parse driver from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConnectionError> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Driver::Postgres),
            "mysql" | "mariadb" => Ok(Driver::MySql),
            "mssql" | "sqlserver" | "sql_server" => Ok(Driver::MsSql),
            "duckdb" | "duck" => Ok(Driver::DuckDb),
            "oracle" => Ok(Driver::Oracle),
            other => Err(ConnectionError::UnsupportedDriver(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Sqlite => "sqlite",
            Driver::Postgres => "postgres",
            Driver::MySql => "mysql",
            Driver::MsSql => "mssql",
            Driver::DuckDb => "duckdb",
            Driver::Oracle => "oracle",
        }
    }

    /// SQL dialect spoken by this driver.
    pub fn dialect(&self) -> Dialect {
        match self {
            Driver::Sqlite => Dialect::Sqlite,
            Driver::Postgres => Dialect::Postgres,
            Driver::MySql => Dialect::MySql,
            Driver::MsSql => Dialect::TSql,
            Driver::DuckDb => Dialect::DuckDb,
            Driver::Oracle => Dialect::Oracle,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one physical database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionDescriptor {
    pub driver: Driver,
    pub connection_string: String,
}

impl ConnectionDescriptor {
    pub fn new(driver: Driver, connection_string: impl Into<String>) -> Self {
        Self {
            driver,
            connection_string: connection_string.into(),
        }
    }

    /// A SQLite database file, or `:memory:`.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self::new(Driver::Sqlite, path)
    }

    pub fn is_in_memory(&self) -> bool {
        self.driver == Driver::Sqlite
            && (self.connection_string.is_empty() || self.connection_string == ":memory:")
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.driver, self.connection_string)
    }
}
