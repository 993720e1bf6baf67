//! SQLite dialect.
//!
//! SQLite features:
//! - ANSI identifier quoting (`"`)
//! - Positional `?` placeholders
//! - Result metadata reports bare column names, so joined columns are aliased
//! - FULL OUTER JOIN since 3.39 (the bundled library is newer)
//! - No spatial predicates without SpatiaLite

use super::helpers;
use super::SqlDialect;

/// SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    // Uses default placeholder (?) and no spatial template
}
