//! Join expressions and per-store join criteria.
//!
//! A [`JoinExpression`] always relates the store being joined ("this" store) to
//! one store already in the chain, named by `other_alias`. The alias defaults
//! to the other store's table name, matching the default alias used by
//! [`JoinChain::begin`](crate::join::JoinChain::begin) and
//! [`JoinChain::join`](crate::join::JoinChain::join).

use std::fmt;

use super::{BooleanOperator, CompareOp, DaoCriteria};
use crate::mapping::ClassMapping;
use crate::value::Value;

/// How a store is attached to the stores before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

impl JoinType {
    /// Whether this join can produce rows where one side is absent.
    pub fn is_outer(self) -> bool {
        !matches!(self, JoinType::Inner)
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinType::Inner => "inner",
            JoinType::LeftOuter => "left outer",
            JoinType::RightOuter => "right outer",
            JoinType::FullOuter => "full outer",
        };
        f.write_str(name)
    }
}

/// Relation used by a join expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOp {
    Equal,
    Greater,
    Lesser,
}

impl JoinOp {
    /// The same relation read with its operands swapped.
    pub fn mirror(self) -> Self {
        match self {
            JoinOp::Equal => JoinOp::Equal,
            JoinOp::Greater => JoinOp::Lesser,
            JoinOp::Lesser => JoinOp::Greater,
        }
    }
}

impl From<JoinOp> for CompareOp {
    fn from(op: JoinOp) -> Self {
        match op {
            JoinOp::Equal => CompareOp::Equal,
            JoinOp::Greater => CompareOp::Greater,
            JoinOp::Lesser => CompareOp::Lesser,
        }
    }
}

/// A relation in the ON clause of a joined store.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinExpression {
    /// `left_property op right_property`, one side on the other store and one on this store.
    Properties {
        left_property: String,
        right_property: String,
        op: JoinOp,
        other_alias: String,
        /// `true`: `left_property` belongs to the other store.
        other_is_left: bool,
        matches: bool,
    },

    /// `property op value`, where `property` belongs to the other store.
    Value {
        property: String,
        value: Value,
        op: JoinOp,
        other_alias: String,
        matches: bool,
    },
}

impl JoinExpression {
    /// `other.left_property op this.right_property`.
    pub fn properties(
        other: &ClassMapping,
        left_property: &str,
        op: JoinOp,
        right_property: &str,
    ) -> Self {
        JoinExpression::Properties {
            left_property: left_property.into(),
            right_property: right_property.into(),
            op,
            other_alias: other.table().into(),
            other_is_left: true,
            matches: true,
        }
    }

    /// `other.left_property = this.right_property`.
    pub fn equal(other: &ClassMapping, left_property: &str, right_property: &str) -> Self {
        Self::properties(other, left_property, JoinOp::Equal, right_property)
    }

    /// `other.left_property > this.right_property`.
    pub fn greater(other: &ClassMapping, left_property: &str, right_property: &str) -> Self {
        Self::properties(other, left_property, JoinOp::Greater, right_property)
    }

    /// `other.left_property < this.right_property`.
    pub fn lesser(other: &ClassMapping, left_property: &str, right_property: &str) -> Self {
        Self::properties(other, left_property, JoinOp::Lesser, right_property)
    }

    /// `other.property op value`.
    pub fn value(other: &ClassMapping, property: &str, op: JoinOp, value: impl Into<Value>) -> Self {
        JoinExpression::Value {
            property: property.into(),
            value: value.into(),
            op,
            other_alias: other.table().into(),
            matches: true,
        }
    }

    /// `other.property = value`.
    pub fn value_equal(other: &ClassMapping, property: &str, value: impl Into<Value>) -> Self {
        Self::value(other, property, JoinOp::Equal, value)
    }

    /// Refer to the other store by an explicit alias instead of its table name.
    pub fn with_alias(mut self, alias: &str) -> Self {
        match &mut self {
            JoinExpression::Properties { other_alias, .. }
            | JoinExpression::Value { other_alias, .. } => *other_alias = alias.into(),
        }
        self
    }

    pub fn other_alias(&self) -> &str {
        match self {
            JoinExpression::Properties { other_alias, .. }
            | JoinExpression::Value { other_alias, .. } => other_alias,
        }
    }

    pub fn op(&self) -> JoinOp {
        match self {
            JoinExpression::Properties { op, .. } | JoinExpression::Value { op, .. } => *op,
        }
    }

    pub fn matches(&self) -> bool {
        match self {
            JoinExpression::Properties { matches, .. }
            | JoinExpression::Value { matches, .. } => *matches,
        }
    }

    /// The complementary expression, of the same variant.
    pub fn invert(&self) -> Self {
        let mut inverted = self.clone();
        match &mut inverted {
            JoinExpression::Properties { matches, .. }
            | JoinExpression::Value { matches, .. } => *matches = !*matches,
        }
        inverted
    }

    /// Restate the relation with left and right operands swapped.
    ///
    /// `other.a > this.b` becomes `this.b < other.a`. Value expressions are
    /// returned unchanged.
    pub fn flip(&self) -> Self {
        match self {
            JoinExpression::Properties {
                left_property,
                right_property,
                op,
                other_alias,
                other_is_left,
                matches,
            } => JoinExpression::Properties {
                left_property: right_property.clone(),
                right_property: left_property.clone(),
                op: op.mirror(),
                other_alias: other_alias.clone(),
                other_is_left: !other_is_left,
                matches: *matches,
            },
            JoinExpression::Value { .. } => self.clone(),
        }
    }
}

impl fmt::Display for JoinExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = if self.matches() { "" } else { "NOT " };
        match self {
            JoinExpression::Properties {
                left_property,
                right_property,
                op,
                other_alias,
                other_is_left,
                ..
            } => {
                if *other_is_left {
                    write!(f, "{}{}.{} {:?} {}", not, other_alias, left_property, op, right_property)
                } else {
                    write!(f, "{}{} {:?} {}.{}", not, left_property, op, other_alias, right_property)
                }
            }
            JoinExpression::Value {
                property,
                value,
                op,
                other_alias,
                ..
            } => write!(f, "{}{}.{} {:?} {}", not, other_alias, property, op, value),
        }
    }
}

/// Everything needed to attach one store to a join chain.
///
/// `join_type` has no default: a joined store without one is rejected when
/// the chain is compiled.
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use = "builders have no effect until used"]
pub struct JoinCriteria {
    /// Alias of the joined store; defaults to its table name.
    pub alias: Option<String>,
    pub join_type: Option<JoinType>,
    /// How the ON-clause expressions are combined.
    pub bool_op: BooleanOperator,
    pub expressions: Vec<JoinExpression>,
    /// Same-store filter, added to the WHERE clause.
    pub criteria: Option<DaoCriteria>,
}

impl JoinCriteria {
    pub fn new(join_type: JoinType) -> Self {
        Self {
            join_type: Some(join_type),
            ..Self::default()
        }
    }

    pub fn inner() -> Self {
        Self::new(JoinType::Inner)
    }

    pub fn left_outer() -> Self {
        Self::new(JoinType::LeftOuter)
    }

    pub fn right_outer() -> Self {
        Self::new(JoinType::RightOuter)
    }

    pub fn full_outer() -> Self {
        Self::new(JoinType::FullOuter)
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Combine ON-clause expressions with OR instead of AND.
    pub fn any(mut self) -> Self {
        self.bool_op = BooleanOperator::Or;
        self
    }

    /// Add an ON-clause expression.
    pub fn on(mut self, expr: JoinExpression) -> Self {
        self.expressions.push(expr);
        self
    }

    /// Filter the joined store's own rows.
    pub fn filter(mut self, criteria: impl Into<DaoCriteria>) -> Self {
        self.criteria = Some(criteria.into());
        self
    }
}
