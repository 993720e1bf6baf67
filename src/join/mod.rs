//! Typed join chains.
//!
//! A [`JoinChain`] is an immutable list of stores plus the function that turns
//! one result row into the chain's nested result type. Every
//! [`join`](JoinChain::join) returns a new chain and leaves the old one usable:
//!
//! ```ignore
//! let people = JoinChain::begin(&people_store, None, None);
//! let with_pets = people.join(&pet_store, JoinCriteria::left_outer()
//!     .on(JoinExpression::equal(people_store.mapping(), "ID", "OwnerID")))?;
//!
//! for row in with_pets.get(&[], Window::all())? {
//!     let person: Option<Person> = row.left;
//!     let pet: Option<Pet> = row.right;
//! }
//! ```

mod materialize;

use std::fmt;
use std::sync::Arc;

use crate::config::{ConnectionDescriptor, Settings};
use crate::criteria::{DaoCriteria, JoinCriteria, JoinSortOrder};
use crate::error::{DaoError, DaoResult};
use crate::mapping::{ClassMapping, RecordMapping};
use crate::sql::compiler::context;
use crate::sql::{Dialect, JoinCompiler, JoinInfo, QueryPool, MAX_STORES};
use crate::transport::{SqliteTransport, Transport};

pub use materialize::Window;
use materialize::RowReader;

// =============================================================================
// Data sources and stores
// =============================================================================

/// One database: its descriptor, dialect, default transport, and query pool.
pub struct DataSource {
    descriptor: ConnectionDescriptor,
    dialect: Dialect,
    transport: Arc<dyn Transport + Send + Sync>,
    pool: QueryPool,
}

impl DataSource {
    /// Dialect follows the descriptor's driver.
    pub fn new(descriptor: ConnectionDescriptor, transport: Arc<dyn Transport + Send + Sync>) -> Self {
        Self {
            dialect: descriptor.driver.dialect(),
            descriptor,
            transport,
            pool: QueryPool::default(),
        }
    }

    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool = QueryPool::new(capacity);
        self
    }

    /// Open the named connection from settings.
    ///
    /// Only SQLite connections can be opened here; other drivers need
    /// [`DataSource::new`] with a caller-supplied transport.
    pub fn from_settings(settings: &Settings, name: &str) -> DaoResult<Self> {
        let descriptor = settings.get_connection(name)?.descriptor()?;
        if descriptor.driver != crate::config::Driver::Sqlite {
            return Err(DaoError::config(format!(
                "Connection '{}' uses driver '{}'; only sqlite connections can be opened from settings",
                name, descriptor.driver
            )));
        }

        let transport = if descriptor.is_in_memory() {
            SqliteTransport::open_in_memory()?
        } else {
            SqliteTransport::open(&descriptor.connection_string)?
        };
        tracing::debug!(connection = name, descriptor = %descriptor, "opened data source");

        Ok(Self::new(descriptor, Arc::new(transport)).with_pool_capacity(settings.query.pool_capacity))
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The transport used when no override is given.
    pub fn transport(&self) -> &(dyn Transport + Send + Sync) {
        self.transport.as_ref()
    }

    pub fn pool(&self) -> &QueryPool {
        &self.pool
    }

    /// Whether stores on both sources can be combined in one statement.
    pub fn can_join(&self, other: &DataSource) -> bool {
        self.descriptor == other.descriptor
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("descriptor", &self.descriptor)
            .field("dialect", &self.dialect)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

/// A queryable collection of `T` records on one data source.
pub struct Store<T> {
    source: Arc<DataSource>,
    records: Arc<RecordMapping<T>>,
}

impl<T: Default + 'static> Store<T> {
    /// Fails if the record mapping leaves a column unbound.
    pub fn new(source: Arc<DataSource>, records: RecordMapping<T>) -> DaoResult<Self> {
        records.validate()?;
        Ok(Self {
            source,
            records: Arc::new(records),
        })
    }

    pub fn mapping(&self) -> &ClassMapping {
        self.records.mapping()
    }

    pub fn source(&self) -> &Arc<DataSource> {
        &self.source
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            records: Arc::clone(&self.records),
        }
    }
}

impl<T> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("table", &self.records.mapping().table())
            .field("source", &self.source.descriptor)
            .finish()
    }
}

// =============================================================================
// Join chains
// =============================================================================

/// A record from the chain so far, paired with the record of the store joined onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinResult<L, R> {
    pub left: L,
    /// `None` when the row has no record for the joined store (outer joins).
    pub right: Option<R>,
}

type Materializer<T> = Arc<dyn Fn(&RowReader<'_>) -> DaoResult<T> + Send + Sync>;

/// An immutable N-way join over stores of one data source.
///
/// `T` is the nested result type: `Option<A>` for the root store, then
/// `JoinResult<_, B>`, `JoinResult<JoinResult<_, B>, C>`, and so on.
pub struct JoinChain<T> {
    source: Arc<DataSource>,
    stores: Arc<[JoinInfo]>,
    build: Materializer<T>,
}

impl<T> Clone for JoinChain<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            stores: Arc::clone(&self.stores),
            build: Arc::clone(&self.build),
        }
    }
}

impl<T> fmt::Debug for JoinChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinChain")
            .field("source", &self.source.descriptor)
            .field(
                "aliases",
                &self.stores.iter().map(|s| s.alias.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<A: Default + 'static> JoinChain<Option<A>> {
    /// Start a chain at `store`, optionally filtered by `criteria`.
    ///
    /// The alias defaults to the store's table name.
    pub fn begin(store: &Store<A>, criteria: Option<DaoCriteria>, alias: Option<&str>) -> Self {
        let info = JoinInfo::root(Arc::clone(store.records.mapping()), criteria, alias);
        let records = Arc::clone(&store.records);
        Self {
            source: Arc::clone(&store.source),
            stores: Arc::from(vec![info]),
            build: Arc::new(move |row: &RowReader<'_>| row.read(0, &records)),
        }
    }
}

impl<T: 'static> JoinChain<T> {
    /// Attach `store` to the chain.
    ///
    /// Fails if the store lives on another connection, its alias is already
    /// taken, an expression names an alias not yet in the chain, or the
    /// chain is full.
    pub fn join<B: Default + 'static>(
        &self,
        store: &Store<B>,
        criteria: JoinCriteria,
    ) -> DaoResult<JoinChain<JoinResult<T, B>>> {
        self.check_join(store, &criteria)
            .map_err(|e| context(e, "join"))?;

        let index = self.stores.len();
        let mut stores = self.stores.to_vec();
        stores.push(JoinInfo::joined(Arc::clone(store.records.mapping()), criteria));

        let left = Arc::clone(&self.build);
        let records = Arc::clone(&store.records);
        Ok(JoinChain {
            source: Arc::clone(&self.source),
            stores: Arc::from(stores),
            build: Arc::new(move |row: &RowReader<'_>| {
                Ok(JoinResult {
                    left: left(row)?,
                    right: row.read(index, &records)?,
                })
            }),
        })
    }

    fn check_join<B>(&self, store: &Store<B>, criteria: &JoinCriteria) -> DaoResult<()> {
        if !self.source.can_join(&store.source) {
            return Err(DaoError::config(format!(
                "DAO does not support native joins with '{}' ({} vs {})",
                store.records.mapping().table(),
                self.source.descriptor,
                store.source.descriptor
            )));
        }
        if self.stores.len() >= MAX_STORES {
            return Err(DaoError::config(format!(
                "A join supports at most {} stores",
                MAX_STORES
            )));
        }

        let alias = criteria
            .alias
            .as_deref()
            .unwrap_or_else(|| store.records.mapping().table());
        if self.stores.iter().any(|s| s.alias == alias) {
            return Err(DaoError::config(format!(
                "You cannot use the same alias multiple times: '{}'",
                alias
            )));
        }
        for expr in &criteria.expressions {
            let other = expr.other_alias();
            if !self.stores.iter().any(|s| s.alias == other) {
                return Err(DaoError::config(format!(
                    "Join criteria aliases must match an already provided DAO alias: '{}'",
                    other
                )));
            }
        }
        Ok(())
    }

    /// Store aliases, in chain order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.stores.iter().map(|s| s.alias.as_str())
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn source(&self) -> &Arc<DataSource> {
        &self.source
    }

    /// Run the join on the data source's transport.
    pub fn get(&self, orders: &[JoinSortOrder], window: Window) -> DaoResult<Vec<T>> {
        self.get_in(self.source.transport(), orders, window)
    }

    /// Run the join on `transport`, e.g. one bound to an open transaction.
    pub fn get_in(
        &self,
        transport: &dyn Transport,
        orders: &[JoinSortOrder],
        window: Window,
    ) -> DaoResult<Vec<T>> {
        let mut query = self.source.pool.checkout();
        JoinCompiler::new(&self.source.dialect, &self.stores)?.select(orders, &mut query)?;

        let query = &*query;
        let mut results = Vec::new();
        transport.execute_query(query.sql(), query.params(), &mut |cursor| {
            materialize::collect(cursor, query, &self.stores, window, &*self.build, &mut results)
        })?;

        tracing::debug!(
            stores = self.stores.len(),
            start = window.start,
            limit = ?window.limit,
            rows = results.len(),
            "join query returned"
        );
        Ok(results)
    }

    /// Count the rows the join produces, ignoring any window.
    pub fn count(&self) -> DaoResult<i64> {
        self.count_in(self.source.transport())
    }

    /// Count on `transport` instead of the data source's default.
    pub fn count_in(&self, transport: &dyn Transport) -> DaoResult<i64> {
        let mut query = self.source.pool.checkout();
        JoinCompiler::new(&self.source.dialect, &self.stores)?.count(&mut query)?;
        transport.execute_count(query.sql(), query.params())
    }
}
