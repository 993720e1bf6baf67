//! SQLite transport using [`rusqlite`].
//!
//! ```ignore
//! let transport = SqliteTransport::open_in_memory()?;
//! transport.execute_batch("CREATE TABLE dao1 (id INTEGER PRIMARY KEY, name TEXT)")?;
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection};

use super::{CursorHandler, Row, RowCursor, Transport};
use crate::error::{DaoError, DaoResult, TransportError};
use crate::value::Value;

/// A single SQLite connection behind a mutex.
///
/// Statements from different threads are serialized on the connection.
/// While a [`SqliteTransaction`] is open, other threads wait for it to end and
/// the owning thread must go through the transaction itself.
#[derive(Debug)]
pub struct SqliteTransport {
    conn: Mutex<Connection>,
    tx_owner: Mutex<Option<ThreadId>>,
}

const HELD_BY_TRANSACTION: &str =
    "connection is held by an open transaction on this thread; use get_in/count_in";

impl SqliteTransport {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            tx_owner: Mutex::new(None),
        }
    }

    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> DaoResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            DaoError::config(format!("Cannot open SQLite database '{}': {}", path.display(), e))
        })?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> DaoResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DaoError::config(format!("Cannot open in-memory SQLite database: {}", e)))?;
        Ok(Self::new(conn))
    }

    /// Run one or more statements without parameters (fixtures, DDL).
    pub fn execute_batch(&self, sql: &str) -> DaoResult<()> {
        self.lock(sql, &[])?
            .execute_batch(sql)
            .map_err(|e| DaoError::execution(sql, &[], e))
    }

    /// Begin a transaction. The connection stays locked until it ends.
    pub fn transaction(&self) -> DaoResult<SqliteTransaction<'_>> {
        let conn = self.lock("BEGIN", &[])?;
        conn.execute_batch("BEGIN")
            .map_err(|e| DaoError::execution("BEGIN", &[], e))?;
        *owner(&self.tx_owner) = Some(thread::current().id());
        Ok(SqliteTransaction {
            conn,
            owner: &self.tx_owner,
            finished: false,
        })
    }

    /// Lock the connection, failing instead of blocking when this thread's
    /// own transaction holds it.
    fn lock(&self, statement: &str, params: &[Value]) -> DaoResult<MutexGuard<'_, Connection>> {
        if *owner(&self.tx_owner) == Some(thread::current().id()) {
            return Err(DaoError::execution(statement, params, HELD_BY_TRANSACTION));
        }
        // A panic mid-statement leaves the connection itself usable.
        Ok(self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

fn owner(slot: &Mutex<Option<ThreadId>>) -> MutexGuard<'_, Option<ThreadId>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Transport for SqliteTransport {
    fn execute_query(
        &self,
        statement: &str,
        params: &[Value],
        handler: &mut CursorHandler<'_>,
    ) -> DaoResult<()> {
        query(&*self.lock(statement, params)?, statement, params, handler)
    }

    fn execute_count(&self, statement: &str, params: &[Value]) -> DaoResult<i64> {
        count(&*self.lock(statement, params)?, statement, params)
    }
}

/// An open transaction on a [`SqliteTransport`].
///
/// Rolled back on drop unless [`commit`](Self::commit) was called.
#[derive(Debug)]
pub struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    owner: &'a Mutex<Option<ThreadId>>,
    finished: bool,
}

impl SqliteTransaction<'_> {
    pub fn commit(mut self) -> DaoResult<()> {
        self.finished = true;
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| DaoError::execution("COMMIT", &[], e))
    }

    pub fn rollback(mut self) -> DaoResult<()> {
        self.finished = true;
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DaoError::execution("ROLLBACK", &[], e))
    }

    /// Run statements without parameters inside the transaction.
    pub fn execute_batch(&self, sql: &str) -> DaoResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DaoError::execution(sql, &[], e))
    }
}

impl Transport for SqliteTransaction<'_> {
    fn execute_query(
        &self,
        statement: &str,
        params: &[Value],
        handler: &mut CursorHandler<'_>,
    ) -> DaoResult<()> {
        query(&self.conn, statement, params, handler)
    }

    fn execute_count(&self, statement: &str, params: &[Value]) -> DaoResult<i64> {
        count(&self.conn, statement, params)
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(error = %e, "failed to roll back abandoned transaction");
            }
        }
        *owner(self.owner) = None;
    }
}

// =============================================================================
// Execution
// =============================================================================

fn query(
    conn: &Connection,
    statement: &str,
    params: &[Value],
    handler: &mut CursorHandler<'_>,
) -> DaoResult<()> {
    let mut stmt = conn
        .prepare(statement)
        .map_err(|e| DaoError::execution(statement, params, e))?;
    let columns = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query(params_from_iter(params))
        .map_err(|e| DaoError::execution(statement, params, e))?;

    let mut cursor = SqliteCursor { columns, rows };
    handler(&mut cursor)
}

fn count(conn: &Connection, statement: &str, params: &[Value]) -> DaoResult<i64> {
    conn.query_row(statement, params_from_iter(params), |row| row.get::<_, i64>(0))
        .map_err(|e| DaoError::execution(statement, params, e))
}

struct SqliteCursor<'stmt> {
    columns: Vec<String>,
    rows: rusqlite::Rows<'stmt>,
}

impl RowCursor for SqliteCursor<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<&dyn Row>, TransportError> {
        match self.rows.next() {
            Ok(Some(row)) => Ok(Some(row as &dyn Row)),
            Ok(None) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Row for rusqlite::Row<'_> {
    fn is_null(&self, index: usize) -> Result<bool, TransportError> {
        Ok(matches!(self.get_ref(index)?, ValueRef::Null))
    }

    fn value(&self, index: usize) -> Result<Value, TransportError> {
        Ok(match self.get_ref(index)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(bytes) => Value::Text(std::str::from_utf8(bytes)?.to_owned()),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        })
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use rusqlite::types::Value as Sqlite;

        Ok(match self {
            Value::Null => ToSqlOutput::Owned(Sqlite::Null),
            Value::Integer(i) => ToSqlOutput::Owned(Sqlite::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(Sqlite::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Boolean(b) => ToSqlOutput::Owned(Sqlite::Integer(i64::from(*b))),
            Value::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
        })
    }
}
