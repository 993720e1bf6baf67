//! ANSI SQL dialect - base reference implementation.
//!
//! This provides the ANSI SQL standard behavior as a reference.
//! Columns are read back by their qualified name (`A.id`), so no column
//! aliases are emitted.

use super::helpers;
use super::SqlDialect;

/// ANSI SQL dialect (reference implementation).
#[derive(Debug, Clone, Copy)]
pub struct Ansi;

impl SqlDialect for Ansi {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn needs_column_aliases(&self) -> bool {
        false
    }
}
