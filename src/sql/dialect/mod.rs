//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the dialect differences
//! that matter to join compilation. Each dialect implements `SqlDialect`:
//!
//! - Identifier quoting: `"` (ANSI/SQLite/PG/DuckDB/Oracle), `` ` `` (MySQL), `[]` (T-SQL)
//! - Placeholders: `?` vs `$n` vs `@pn` vs `:n`
//! - Column aliases: whether joined columns need explicit aliases, and whether `AS` is used
//! - FULL OUTER JOIN: keyword, or unsupported
//! - Spatial containment template
//!
//! # Usage
//!
//! ```ignore
//! use daojoin::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("user");  // "user"
//! let param = dialect.placeholder(1);             // $1
//! ```
//!
//! | Feature | SQLite | PostgreSQL | SQL Server | MySQL | DuckDB | Oracle |
//! |---------|--------|-----------|------------|-------|--------|--------|
//! | FULL OUTER JOIN | 3.39+ | ✓ | ✓ | ❌ | ✓ | ✓ |
//! | Spatial `within` | ❌ | PostGIS | ✓ | ✓ | spatial ext | Oracle Spatial |

mod ansi;
mod duckdb;
pub mod helpers;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod tsql;

// Note: Ansi is exported as a reference implementation for testing and documentation.
// It is NOT included in the Dialect enum: it reads columns back by qualified name
// instead of aliasing them, which no shipped transport supports.
pub use ansi::Ansi;
pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use tsql::TSql;

use super::token::TokenStream;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Placeholder text for the `n`th bound parameter (1-based).
    fn placeholder(&self, n: usize) -> String {
        helpers::placeholder_question(n)
    }

    // =========================================================================
    // Column Aliases
    // =========================================================================

    /// Whether joined columns must be given explicit aliases.
    ///
    /// Drivers that report bare column names in result metadata need this,
    /// otherwise `A.id` and `B.id` collide.
    fn needs_column_aliases(&self) -> bool {
        true
    }

    /// Whether column aliases are introduced with `AS`.
    fn needs_as_for_column_aliases(&self) -> bool {
        true
    }

    // =========================================================================
    // JOIN Syntax
    // =========================================================================

    /// Keyword for a full outer join, or `None` if the dialect has none.
    fn full_outer_join_keyword(&self) -> Option<&'static str> {
        Some("FULL OUTER JOIN")
    }

    // =========================================================================
    // Spatial
    // =========================================================================

    /// Render "`column` lies within the geometry bound at `wkt_param`".
    ///
    /// Returns `None` if the dialect has no spatial support.
    fn emit_within(
        &self,
        column: &TokenStream,
        wkt_param: usize,
        srid: Option<i64>,
    ) -> Option<TokenStream> {
        let _ = (column, wkt_param, srid);
        None
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
    MySql,
    TSql,
    DuckDb,
    Oracle,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Sqlite => &Sqlite,
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
            Dialect::TSql => &TSql,
            Dialect::DuckDb => &DuckDb,
            Dialect::Oracle => &Oracle,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn placeholder(&self, n: usize) -> String {
        self.dialect().placeholder(n)
    }

    fn needs_column_aliases(&self) -> bool {
        self.dialect().needs_column_aliases()
    }

    fn needs_as_for_column_aliases(&self) -> bool {
        self.dialect().needs_as_for_column_aliases()
    }

    fn full_outer_join_keyword(&self) -> Option<&'static str> {
        self.dialect().full_outer_join_keyword()
    }

    fn emit_within(
        &self,
        column: &TokenStream,
        wkt_param: usize,
        srid: Option<i64>,
    ) -> Option<TokenStream> {
        self.dialect().emit_within(column, wkt_param, srid)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
