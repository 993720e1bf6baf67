//! Query-execution boundary.
//!
//! The join layer never talks to a database directly. It hands a statement and
//! its parameters to a [`Transport`] and reads rows back through a forward-only
//! [`RowCursor`]. [`sqlite::SqliteTransport`] is the reference implementation.

pub mod sqlite;

use crate::error::{DaoResult, TransportError};
use crate::value::Value;

pub use sqlite::{SqliteTransaction, SqliteTransport};

/// One result row, read by column ordinal.
pub trait Row {
    fn is_null(&self, index: usize) -> Result<bool, TransportError>;

    fn value(&self, index: usize) -> Result<Value, TransportError>;
}

/// Forward-only cursor over a result set.
pub trait RowCursor {
    /// Result column names, in ordinal order.
    fn columns(&self) -> &[String];

    /// Advance to the next row. `Ok(None)` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<&dyn Row>, TransportError>;
}

/// Callback that consumes a cursor. Errors it returns are passed through unchanged.
pub type CursorHandler<'h> = dyn FnMut(&mut dyn RowCursor) -> DaoResult<()> + 'h;

/// Executes compiled statements.
///
/// Implementations wrap their own failures with
/// [`DaoError::execution`](crate::error::DaoError::execution) so the statement
/// and parameters travel with the error.
pub trait Transport {
    /// Run a row-returning statement and hand its cursor to `handler`.
    fn execute_query(
        &self,
        statement: &str,
        params: &[Value],
        handler: &mut CursorHandler<'_>,
    ) -> DaoResult<()>;

    /// Run a statement returning a single integer.
    fn execute_count(&self, statement: &str, params: &[Value]) -> DaoResult<i64>;
}
