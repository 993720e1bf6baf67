//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! T-SQL differences from ANSI:
//! - Square bracket identifier quoting (`[name]`)
//! - Named `@pn` placeholders
//! - N'...' prefix for Unicode strings
//! - `geometry::STWithin` method syntax for spatial containment

use super::helpers;
use super::SqlDialect;
use crate::sql::token::TokenStream;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        // T-SQL uses N'...' for Unicode strings
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn placeholder(&self, n: usize) -> String {
        helpers::placeholder_at(n)
    }

    fn emit_within(
        &self,
        column: &TokenStream,
        wkt_param: usize,
        srid: Option<i64>,
    ) -> Option<TokenStream> {
        Some(helpers::emit_within_tsql(column, wkt_param, srid))
    }
}
