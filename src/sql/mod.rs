//! SQL generation for join chains.
//!
//! - [`compiler`] - N-way join compiler (SELECT and COUNT)
//! - [`query`] - compiled join queries and their reuse pool
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod compiler;
pub mod dialect;
pub mod query;
pub mod token;


// Re-export commonly used types at the sql module level
pub use compiler::{JoinCompiler, JoinInfo, MAX_STORES};
pub use dialect::{Dialect, SqlDialect};
pub use query::{JoinQuery, PooledQuery, QueryPool};
pub use token::{Token, TokenStream};
