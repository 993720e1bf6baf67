//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - Numbered `$n` placeholders
//! - PostGIS `ST_Within` for spatial containment

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, n: usize) -> String {
        helpers::placeholder_dollar(n)
    }

    fn emit_within(
        &self,
        column: &TokenStream,
        wkt_param: usize,
        srid: Option<i64>,
    ) -> Option<TokenStream> {
        Some(helpers::emit_st_within(column, wkt_param, srid))
    }
}
