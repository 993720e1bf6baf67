//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Positional `?` placeholders
//! - No FULL OUTER JOIN
//! - `ST_Within` for spatial containment (5.7+)

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn full_outer_join_keyword(&self) -> Option<&'static str> {
        // Emulating it needs a UNION of two outer joins, which breaks the
        // one-statement shape of a join chain.
        None
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
