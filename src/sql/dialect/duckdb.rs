//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible with extensions:
//! - ANSI identifier quoting (`"`)
//! - Positional `?` placeholders
//! - `ST_Within` through the spatial extension (planar, SRID ignored)

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn emit_within(
        &self,
        column: &TokenStream,
        wkt_param: usize,
        _srid: Option<i64>,
    ) -> Option<TokenStream> {
        Some(helpers::emit_st_within(column, wkt_param, None))
    }
}
