//! Compiled join queries and the pool that recycles their buffers.
//!
//! A [`JoinQuery`] owns the token stream, statement text, bound parameters and
//! per-store column prefixes of one compile. Queries are checked out of a
//! [`QueryPool`] for exactly one compile/execute/materialize cycle; dropping
//! the [`PooledQuery`] guard resets the buffers and hands them back.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

use super::token::TokenStream;
use crate::value::Value;

/// Default number of idle queries a pool keeps.
pub const DEFAULT_POOL_CAPACITY: usize = 16;

/// Statement text, parameters, and column prefixes produced by one compile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinQuery {
    pub(crate) tokens: TokenStream,
    pub(crate) sql: String,
    pub(crate) params: Vec<Value>,
    pub(crate) prefixes: Vec<String>,
}

impl JoinQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// The statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound parameters, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Column-name prefix of each store in the result set, in chain order.
    ///
    /// A store's mapped column `c` is read from the result column `prefix + c`.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Tokens the statement was serialized from.
    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    /// Reset all buffers, keeping their allocations.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.sql.clear();
        self.params.clear();
        self.prefixes.clear();
    }
}

/// Checkout/return pool of [`JoinQuery`] buffers.
///
/// Shared by every store on one data source. At most `capacity` idle queries
/// are retained; extra returns are dropped.
#[derive(Debug)]
pub struct QueryPool {
    idle: Mutex<Vec<JoinQuery>>,
    capacity: usize,
}

impl QueryPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Take a reset query out of the pool, allocating if none is idle.
    pub fn checkout(&self) -> PooledQuery<'_> {
        let query = self.lock().pop().unwrap_or_default();
        PooledQuery {
            pool: self,
            query: Some(query),
        }
    }

    /// Number of idle queries currently held.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn give_back(&self, mut query: JoinQuery) {
        query.clear();
        let mut idle = self.lock();
        if idle.len() < self.capacity {
            idle.push(query);
        }
    }

    // A panic while holding the lock can only leave a shorter idle list behind.
    fn lock(&self) -> MutexGuard<'_, Vec<JoinQuery>> {
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for QueryPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

/// Exclusive use of a pooled [`JoinQuery`]; returned to the pool on drop.
#[derive(Debug)]
pub struct PooledQuery<'a> {
    pool: &'a QueryPool,
    query: Option<JoinQuery>,
}

impl PooledQuery<'_> {
    /// Keep the query and leave the pool one buffer short.
    pub fn detach(mut self) -> JoinQuery {
        self.query.take().unwrap_or_default()
    }
}

impl Deref for PooledQuery<'_> {
    type Target = JoinQuery;

    fn deref(&self) -> &JoinQuery {
        // Only `detach` and `drop` take the query, and both consume the guard.
        self.query.as_ref().unwrap_or_else(|| unreachable!("pooled query taken"))
    }
}

impl DerefMut for PooledQuery<'_> {
    fn deref_mut(&mut self) -> &mut JoinQuery {
        self.query.as_mut().unwrap_or_else(|| unreachable!("pooled query taken"))
    }
}

impl Drop for PooledQuery<'_> {
    fn drop(&mut self) {
        if let Some(query) = self.query.take() {
            self.pool.give_back(query);
        }
    }
}
