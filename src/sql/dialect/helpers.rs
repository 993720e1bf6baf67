//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::super::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: SQLite, Postgres, DuckDB, Oracle
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL (SQL Server, Azure SQL)
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string with N prefix for Unicode (T-SQL).
pub fn quote_string_unicode(s: &str) -> String {
    format!("N'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Placeholders
// =============================================================================

/// Positional `?` placeholder.
/// Used by: SQLite, MySQL, DuckDB
pub fn placeholder_question(_n: usize) -> String {
    "?".into()
}

/// Numbered `$n` placeholder.
/// Used by: Postgres
pub fn placeholder_dollar(n: usize) -> String {
    format!("${}", n)
}

/// Named `@pn` placeholder.
/// Used by: T-SQL
pub fn placeholder_at(n: usize) -> String {
    format!("@p{}", n)
}

/// Numbered `:n` placeholder.
/// Used by: Oracle
pub fn placeholder_colon(n: usize) -> String {
    format!(":{}", n)
}

// =============================================================================
// Spatial
// =============================================================================

/// `ST_Within(column, ST_GeomFromText(?[, srid]))`.
/// Used by: Postgres (PostGIS), MySQL, DuckDB (spatial extension)
pub fn emit_st_within(column: &TokenStream, wkt_param: usize, srid: Option<i64>) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("ST_Within".into()))
        .lparen()
        .append(column)
        .comma()
        .space()
        .push(Token::FunctionName("ST_GeomFromText".into()))
        .lparen()
        .push(Token::Param(wkt_param));
    if let Some(srid) = srid {
        ts.comma().space().push(Token::LitInt(srid));
    }
    ts.rparen().rparen();
    ts
}

/// `column.STWithin(geometry::STGeomFromText(@p, srid)) = 1`.
///
/// SQL Server requires an SRID; 0 is used when none is given.
pub fn emit_within_tsql(column: &TokenStream, wkt_param: usize, srid: Option<i64>) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.append(column)
        .push(Token::Dot)
        .push(Token::Raw("STWithin".into()))
        .lparen()
        .push(Token::Raw("geometry::STGeomFromText".into()))
        .lparen()
        .push(Token::Param(wkt_param))
        .comma()
        .space()
        .push(Token::LitInt(srid.unwrap_or(0)))
        .rparen()
        .rparen()
        .space()
        .push(Token::Eq)
        .space()
        .push(Token::LitInt(1));
    ts
}

/// `SDO_INSIDE(column, SDO_GEOMETRY(:n[, srid])) = 'TRUE'`.
/// Used by: Oracle Spatial
pub fn emit_within_oracle(column: &TokenStream, wkt_param: usize, srid: Option<i64>) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("SDO_INSIDE".into()))
        .lparen()
        .append(column)
        .comma()
        .space()
        .push(Token::FunctionName("SDO_GEOMETRY".into()))
        .lparen()
        .push(Token::Param(wkt_param));
    if let Some(srid) = srid {
        ts.comma().space().push(Token::LitInt(srid));
    }
    ts.rparen()
        .rparen()
        .space()
        .push(Token::Eq)
        .space()
        .push(Token::LitString("TRUE".into()));
    ts
}
