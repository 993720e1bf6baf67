//! Error types for chain construction, compilation, execution, and materialization.

use crate::config::SettingsError;
use crate::value::{Value, ValueError};

/// Result type for data-access operations.
pub type DaoResult<T> = Result<T, DaoError>;

/// Boxed error raised by a transport implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building, compiling, executing, or reading a join.
///
/// Nothing in this crate retries; every variant aborts the current `get`/`count`.
#[derive(Debug, thiserror::Error)]
pub enum DaoError {
    /// Invalid chain construction or store configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The active dialect cannot render the requested construct.
    #[error("Unsupported by {dialect}: {what}")]
    Unsupported { dialect: &'static str, what: String },

    /// The transport failed to execute a statement.
    #[error("Execution failed: {source}; SQL: {{{statement}}} Params: {{{params}}}")]
    Execution {
        statement: String,
        params: String,
        #[source]
        source: TransportError,
    },

    /// A mapped column was absent from the result set.
    #[error("Store '{store}' maps property '{property}' to column '{column}', but that column was not present in the results")]
    MissingColumn {
        store: String,
        property: String,
        column: String,
    },

    /// A column value could not be assigned to its bound field.
    #[error("Unable to set property '{property}' on store '{store}': {source}")]
    Materialization {
        store: String,
        property: String,
        #[source]
        source: ValueError,
    },

    /// Settings could not be loaded.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl DaoError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        DaoError::Configuration(message.into())
    }

    /// Wrap a transport failure with the statement and parameters that caused it.
    pub fn execution(statement: &str, params: &[Value], source: impl Into<TransportError>) -> Self {
        DaoError::Execution {
            statement: statement.to_string(),
            params: render_params(params),
            source: source.into(),
        }
    }

    /// Whether this error comes from invalid configuration rather than runtime state.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DaoError::Configuration(_) | DaoError::Unsupported { .. } | DaoError::Settings(_)
        )
    }
}

/// Render a parameter list for diagnostics.
///
/// Nulls are marked explicitly so they can't be confused with the string `"NULL"`.
pub fn render_params(params: &[Value]) -> String {
    if params.is_empty() {
        return "[empty list]".to_string();
    }
    params
        .iter()
        .map(|value| match value {
            Value::Null => "[db null]".to_string(),
            other => format!("\"{}\"", other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
