//! Oracle dialect.
//!
//! Oracle differences from ANSI:
//! - Numbered `:n` placeholders
//! - Column aliases without `AS`
//! - `SDO_INSIDE` (Oracle Spatial) for spatial containment

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// Oracle dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn placeholder(&self, n: usize) -> String {
        helpers::placeholder_colon(n)
    }

    fn needs_as_for_column_aliases(&self) -> bool {
        false
    }

    fn emit_within(
        &self,
        column: &TokenStream,
        wkt_param: usize,
        srid: Option<i64>,
    ) -> Option<TokenStream> {
        Some(helpers::emit_within_oracle(column, wkt_param, srid))
    }
}
