//! # daojoin
//!
//! N-way joins across typed record stores, compiled to one SQL statement and
//! read back as nested results.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │   Stores (ClassMapping + RecordMapping<T>) on a          │
//! │   DataSource (descriptor, dialect, transport, pool)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [JoinChain::begin / join]
//! ┌─────────────────────────────────────────────────────────┐
//! │   JoinChain<T>: stores + criteria + join expressions     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::JoinCompiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │   JoinQuery: statement, parameters, column prefixes      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [transport::Transport]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Rows → Vec<JoinResult<JoinResult<Option<A>, B>, C>>    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use daojoin::prelude::*;
//!
//! let chain = JoinChain::begin(&people, None, None)
//!     .join(&pets, JoinCriteria::left_outer()
//!         .on(JoinExpression::equal(people.mapping(), "ID", "OwnerID")))?;
//!
//! let rows = chain.get(&[JoinSortOrder::asc(people.mapping(), "ID")], Window::all())?;
//! let total = chain.count()?;
//! ```

pub mod config;
pub mod criteria;
pub mod error;
pub mod join;
pub mod mapping;
pub mod sql;
pub mod transport;
pub mod value;

pub use error::{DaoError, DaoResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{ConnectionDescriptor, Driver, Settings};
    pub use crate::criteria::{
        BooleanOperator, CompareOp, DaoCriteria, Expression, JoinCriteria, JoinExpression,
        JoinOp, JoinSortOrder, JoinType, Shape, SortDirection,
    };
    pub use crate::error::{DaoError, DaoResult};
    pub use crate::join::{DataSource, JoinChain, JoinResult, Store, Window};
    pub use crate::mapping::{ClassMapping, ColumnMapping, RecordMapping};
    pub use crate::sql::dialect::{Dialect, SqlDialect};
    pub use crate::transport::{SqliteTransport, Transport};
    pub use crate::value::{ColumnType, FromValue, Value};
}
