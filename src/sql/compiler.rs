//! N-way join compiler.
//!
//! Turns the stores of a join chain into one SELECT (or COUNT) statement:
//!
//! ```text
//! SELECT "A"."id" AS "A_id", ..., "B"."id" AS "B_id", ...
//! FROM "dao1" "A"
//! INNER JOIN "dao2" "B" ON ("A"."join_field" = "B"."join_field")
//! WHERE (<criteria of A>) AND (<criteria of B>)
//! ORDER BY "A"."id" ASC
//! ```
//!
//! Stores get table aliases `A..Z` in declaration order. Parameters are bound
//! in emission order: ON clauses in join order, then WHERE.

use std::collections::HashMap;
use std::sync::Arc;

use super::dialect::SqlDialect;
use super::query::JoinQuery;
use super::token::{Token, TokenStream};
use crate::criteria::{
    BooleanOperator, CompareOp, DaoCriteria, Expression, JoinCriteria, JoinExpression,
    JoinSortOrder, JoinType, SortDirection,
};
use crate::error::{DaoError, DaoResult};
use crate::mapping::{ClassMapping, ColumnMapping};
use crate::value::Value;

/// Most stores a single join can hold (one table alias letter each).
pub const MAX_STORES: usize = 26;

/// Table alias for the store at `index`: `A`, `B`, ...
pub fn table_alias(index: usize) -> String {
    char::from(b'A' + (index % MAX_STORES) as u8).to_string()
}

/// One store of a join chain, as seen by the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinInfo {
    pub alias: String,
    pub mapping: Arc<ClassMapping>,
    /// `None` on the root store.
    pub join_type: Option<JoinType>,
    pub bool_op: BooleanOperator,
    pub expressions: Vec<JoinExpression>,
    pub criteria: Option<DaoCriteria>,
}

impl JoinInfo {
    /// The first store of a chain. Its alias defaults to the table name.
    pub fn root(mapping: Arc<ClassMapping>, criteria: Option<DaoCriteria>, alias: Option<&str>) -> Self {
        Self {
            alias: alias.unwrap_or(mapping.table()).to_string(),
            mapping,
            join_type: None,
            bool_op: BooleanOperator::And,
            expressions: vec![],
            criteria,
        }
    }

    /// A store joined onto a chain.
    pub fn joined(mapping: Arc<ClassMapping>, join: JoinCriteria) -> Self {
        Self {
            alias: join.alias.unwrap_or_else(|| mapping.table().to_string()),
            mapping,
            join_type: join.join_type,
            bool_op: join.bool_op,
            expressions: join.expressions,
            criteria: join.criteria,
        }
    }
}

/// Compiles a fixed list of stores for one dialect.
///
/// Construction validates the chain shape; `select` and `count` validate
/// properties and aliases as they emit.
#[derive(Debug)]
pub struct JoinCompiler<'a> {
    dialect: &'a dyn SqlDialect,
    stores: &'a [JoinInfo],
    by_alias: HashMap<&'a str, usize>,
}

impl<'a> JoinCompiler<'a> {
    pub fn new(dialect: &'a dyn SqlDialect, stores: &'a [JoinInfo]) -> DaoResult<Self> {
        if stores.len() < 2 {
            return Err(DaoError::config(format!(
                "A join needs at least 2 stores, got {}",
                stores.len()
            )));
        }
        if stores.len() > MAX_STORES {
            return Err(DaoError::config(format!(
                "A join supports at most {} stores, got {}",
                MAX_STORES,
                stores.len()
            )));
        }

        let mut by_alias = HashMap::with_capacity(stores.len());
        for (i, store) in stores.iter().enumerate() {
            if by_alias.insert(store.alias.as_str(), i).is_some() {
                return Err(DaoError::config(format!(
                    "You cannot use the same alias multiple times: '{}'",
                    store.alias
                )));
            }
            if i == 0 {
                continue;
            }
            if store.join_type.is_none() {
                return Err(DaoError::config(format!(
                    "Store '{}' was joined without a join type",
                    store.alias
                )));
            }
            if store.expressions.is_empty() {
                return Err(DaoError::config(format!(
                    "Store '{}' was joined without any join expressions",
                    store.alias
                )));
            }
        }

        Ok(Self {
            dialect,
            stores,
            by_alias,
        })
    }

    /// Compile the row-returning statement into `query`.
    pub fn select(&self, orders: &[JoinSortOrder], query: &mut JoinQuery) -> DaoResult<()> {
        query.clear();
        let JoinQuery {
            tokens,
            sql,
            params,
            prefixes,
        } = query;

        tokens.push(Token::Select).space();
        self.emit_columns(tokens, prefixes);
        tokens.space();
        self.emit_from(tokens, params)?;
        self.emit_where(tokens, params)?;
        self.emit_order_by(tokens, orders)?;
        tokens.write_to(self.dialect, sql);

        tracing::debug!(
            dialect = self.dialect.name(),
            stores = self.stores.len(),
            params = params.len(),
            sql = %sql,
            "compiled join query"
        );
        Ok(())
    }

    /// Compile the `COUNT(*)` statement into `query`. No column list, no ORDER BY.
    pub fn count(&self, query: &mut JoinQuery) -> DaoResult<()> {
        query.clear();
        let JoinQuery {
            tokens, sql, params, ..
        } = query;

        tokens
            .push(Token::Select)
            .space()
            .push(Token::Count)
            .lparen()
            .push(Token::Star)
            .rparen()
            .space();
        self.emit_from(tokens, params)?;
        self.emit_where(tokens, params)?;
        tokens.write_to(self.dialect, sql);

        tracing::debug!(
            dialect = self.dialect.name(),
            stores = self.stores.len(),
            params = params.len(),
            sql = %sql,
            "compiled join count"
        );
        Ok(())
    }

    // =========================================================================
    // SELECT list
    // =========================================================================

    fn emit_columns(&self, ts: &mut TokenStream, prefixes: &mut Vec<String>) {
        let aliasing = self.dialect.needs_column_aliases();
        let with_as = self.dialect.needs_as_for_column_aliases();

        let mut first = true;
        for (i, store) in self.stores.iter().enumerate() {
            let letter = table_alias(i);
            prefixes.push(if aliasing {
                format!("{}_", letter)
            } else {
                format!("{}.", letter)
            });

            for col in store.mapping.columns() {
                if !first {
                    ts.comma().space();
                }
                first = false;
                ts.qualified(&letter, &col.column);
                if aliasing {
                    ts.space();
                    if with_as {
                        ts.push(Token::As).space();
                    }
                    ts.push(Token::Ident(format!("{}_{}", letter, col.column)));
                }
            }
        }
    }

    // =========================================================================
    // FROM / JOIN ... ON
    // =========================================================================

    fn emit_from(&self, ts: &mut TokenStream, params: &mut Vec<Value>) -> DaoResult<()> {
        ts.push(Token::From).space();
        self.emit_table(ts, 0);

        for (i, store) in self.stores.iter().enumerate().skip(1) {
            let Some(join_type) = store.join_type else {
                return Err(DaoError::config(format!(
                    "Store '{}' was joined without a join type",
                    store.alias
                )));
            };

            ts.space();
            match join_type {
                JoinType::Inner => ts.push(Token::Inner).space().push(Token::Join),
                JoinType::LeftOuter => ts
                    .push(Token::Left)
                    .space()
                    .push(Token::Outer)
                    .space()
                    .push(Token::Join),
                JoinType::RightOuter => ts
                    .push(Token::Right)
                    .space()
                    .push(Token::Outer)
                    .space()
                    .push(Token::Join),
                JoinType::FullOuter => {
                    if self.dialect.full_outer_join_keyword().is_none() {
                        return Err(DaoError::Unsupported {
                            dialect: self.dialect.name(),
                            what: format!("full outer join of store '{}'", store.alias),
                        });
                    }
                    ts.push(Token::FullOuterJoin)
                }
            };
            ts.space();
            self.emit_table(ts, i);

            ts.space().push(Token::On).space();
            for (n, expr) in store.expressions.iter().enumerate() {
                if n > 0 {
                    ts.space().push(bool_token(store.bool_op)).space();
                }
                self.emit_join_expression(ts, params, i, expr)
                    .map_err(|e| context(e, &format!("join expression '{}'", expr)))?;
            }
        }
        Ok(())
    }

    fn emit_table(&self, ts: &mut TokenStream, index: usize) {
        ts.push(Token::Ident(self.stores[index].mapping.table().into()))
            .space()
            .push(Token::Ident(table_alias(index)));
    }

    fn emit_join_expression(
        &self,
        ts: &mut TokenStream,
        params: &mut Vec<Value>,
        this: usize,
        expr: &JoinExpression,
    ) -> DaoResult<()> {
        let other = self.resolve(expr.other_alias())?;
        ts.lparen();
        match expr {
            JoinExpression::Properties {
                left_property,
                right_property,
                op,
                other_is_left,
                matches,
                ..
            } => {
                let (left, right) = if *other_is_left {
                    (other, this)
                } else {
                    (this, other)
                };
                self.emit_column(ts, left, left_property)?;
                ts.space()
                    .push(comparison((*op).into(), *matches))
                    .space();
                self.emit_column(ts, right, right_property)?;
            }
            JoinExpression::Value {
                property,
                value,
                op,
                matches,
                ..
            } => {
                self.emit_value_comparison(ts, params, other, property, (*op).into(), value, *matches)?;
            }
        }
        ts.rparen();
        Ok(())
    }

    // =========================================================================
    // WHERE
    // =========================================================================

    fn emit_where(&self, ts: &mut TokenStream, params: &mut Vec<Value>) -> DaoResult<()> {
        let mut first = true;
        for (i, store) in self.stores.iter().enumerate() {
            let Some(criteria) = &store.criteria else {
                continue;
            };
            // An empty AND-list filters nothing.
            if criteria.is_empty() && criteria.bool_op == BooleanOperator::And {
                continue;
            }
            ts.space()
                .push(if first { Token::Where } else { Token::And })
                .space()
                .lparen();
            self.emit_criteria(ts, params, i, criteria)
                .map_err(|e| context(e, &format!("criteria of store '{}'", store.alias)))?;
            ts.rparen();
            first = false;
        }
        Ok(())
    }

    fn emit_criteria(
        &self,
        ts: &mut TokenStream,
        params: &mut Vec<Value>,
        store: usize,
        criteria: &DaoCriteria,
    ) -> DaoResult<()> {
        if criteria.is_empty() {
            emit_constant(ts, criteria.bool_op == BooleanOperator::And);
            return Ok(());
        }
        for (n, expr) in criteria.expressions.iter().enumerate() {
            if n > 0 {
                ts.space().push(bool_token(criteria.bool_op)).space();
            }
            self.emit_expression(ts, params, store, expr)?;
        }
        Ok(())
    }

    fn emit_expression(
        &self,
        ts: &mut TokenStream,
        params: &mut Vec<Value>,
        store: usize,
        expr: &Expression,
    ) -> DaoResult<()> {
        match expr {
            Expression::InList {
                property,
                values,
                matches,
            } => {
                if values.is_empty() {
                    emit_constant(ts, !matches);
                    return Ok(());
                }
                let col = self.column(store, property)?;
                let bound = values
                    .iter()
                    .map(|v| self.coerce(store, col, v.clone()))
                    .collect::<DaoResult<Vec<_>>>()?;
                ts.qualified(&table_alias(store), &col.column).space();
                if !matches {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::In).space().lparen();
                for (n, value) in bound.into_iter().enumerate() {
                    if n > 0 {
                        ts.comma().space();
                    }
                    ts.push(Token::Param(bind(params, value)));
                }
                ts.rparen();
            }

            Expression::Within {
                property,
                shape,
                matches,
            } => {
                let col = self.column(store, property)?;
                let mut column = TokenStream::new();
                column.qualified(&table_alias(store), &col.column);
                let param = params.len() + 1;
                let Some(within) = self.dialect.emit_within(&column, param, shape.srid) else {
                    return Err(DaoError::Unsupported {
                        dialect: self.dialect.name(),
                        what: format!("spatial containment on '{}'", property),
                    });
                };
                bind(params, Value::Text(shape.wkt.clone()));
                if *matches {
                    ts.append(&within);
                } else {
                    ts.push(Token::Not).space().lparen().append(&within).rparen();
                }
            }

            Expression::Compare {
                property,
                op,
                value,
                matches,
            } => {
                self.emit_value_comparison(ts, params, store, property, *op, value, *matches)?;
            }

            Expression::CompareProperty {
                property,
                op,
                other_alias,
                other_property,
                matches,
            } => {
                let other = match other_alias {
                    Some(alias) => self.resolve(alias)?,
                    None => store,
                };
                self.emit_column(ts, store, property)?;
                ts.space().push(comparison(*op, *matches)).space();
                self.emit_column(ts, other, other_property)?;
            }

            Expression::IsNull { property, matches } => {
                self.emit_column(ts, store, property)?;
                ts.space()
                    .push(if *matches { Token::IsNull } else { Token::IsNotNull });
            }

            Expression::Group(group) => {
                ts.lparen();
                self.emit_criteria(ts, params, store, group)?;
                ts.rparen();
            }
        }
        Ok(())
    }

    // =========================================================================
    // ORDER BY
    // =========================================================================

    fn emit_order_by(&self, ts: &mut TokenStream, orders: &[JoinSortOrder]) -> DaoResult<()> {
        if orders.is_empty() {
            return Ok(());
        }
        ts.space().push(Token::OrderBy).space();
        for (n, order) in orders.iter().enumerate() {
            if n > 0 {
                ts.comma().space();
            }
            match order.direction {
                SortDirection::Computed => {
                    ts.push(Token::Raw(order.property.clone()));
                }
                SortDirection::Ascending | SortDirection::Descending => {
                    let store = self.resolve(&order.alias)?;
                    self.emit_column(ts, store, &order.property)?;
                    ts.space().push(if order.direction == SortDirection::Ascending {
                        Token::Asc
                    } else {
                        Token::Desc
                    });
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Shared pieces
    // =========================================================================

    fn resolve(&self, alias: &str) -> DaoResult<usize> {
        self.by_alias.get(alias).copied().ok_or_else(|| {
            DaoError::config(format!(
                "Join criteria aliases must match an already provided DAO alias: '{}'",
                alias
            ))
        })
    }

    fn column(&self, store: usize, property: &str) -> DaoResult<&'a ColumnMapping> {
        let stores: &'a [JoinInfo] = self.stores;
        let info = &stores[store];
        info.mapping.column_for(property).ok_or_else(|| {
            DaoError::config(format!(
                "Store '{}' (table '{}') has no mapped property '{}'",
                info.alias,
                info.mapping.table(),
                property
            ))
        })
    }

    fn emit_column(&self, ts: &mut TokenStream, store: usize, property: &str) -> DaoResult<()> {
        let col = self.column(store, property)?;
        ts.qualified(&table_alias(store), &col.column);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_value_comparison(
        &self,
        ts: &mut TokenStream,
        params: &mut Vec<Value>,
        store: usize,
        property: &str,
        op: CompareOp,
        value: &Value,
        matches: bool,
    ) -> DaoResult<()> {
        let col = self.column(store, property)?;
        ts.qualified(&table_alias(store), &col.column).space();
        // `= NULL` is never true; compare against null the way SQL means it.
        if value.is_null() && op == CompareOp::Equal {
            ts.push(if matches { Token::IsNull } else { Token::IsNotNull });
            return Ok(());
        }
        let value = self.coerce(store, col, value.clone())?;
        ts.push(comparison(op, matches))
            .space()
            .push(Token::Param(bind(params, value)));
        Ok(())
    }

    fn coerce(&self, store: usize, col: &ColumnMapping, value: Value) -> DaoResult<Value> {
        value.coerce(col.column_type).map_err(|e| {
            DaoError::config(format!(
                "Cannot bind a value to {}.{} ({}): {}",
                self.stores[store].alias, col.property, col.column_type, e
            ))
        })
    }
}

fn bind(params: &mut Vec<Value>, value: Value) -> usize {
    params.push(value);
    params.len()
}

fn bool_token(op: BooleanOperator) -> Token {
    match op {
        BooleanOperator::And => Token::And,
        BooleanOperator::Or => Token::Or,
    }
}

/// Operator for `op`, or for its complement when `matches` is false.
fn comparison(op: CompareOp, matches: bool) -> Token {
    match (op, matches) {
        (CompareOp::Equal, true) => Token::Eq,
        (CompareOp::Equal, false) => Token::Ne,
        (CompareOp::Greater, true) => Token::Gt,
        (CompareOp::Greater, false) => Token::Lte,
        (CompareOp::Lesser, true) => Token::Lt,
        (CompareOp::Lesser, false) => Token::Gte,
    }
}

/// `1 = 1` or `1 = 0`.
fn emit_constant(ts: &mut TokenStream, value: bool) {
    ts.push(Token::LitInt(1))
        .space()
        .push(Token::Eq)
        .space()
        .push(Token::LitInt(i64::from(value)));
}

pub(crate) fn context(err: DaoError, what: &str) -> DaoError {
    match err {
        DaoError::Configuration(msg) => {
            DaoError::Configuration(format!("Unable to add {} to query: {}", what, msg))
        }
        other => other,
    }
}
