//! Backend-neutral filter, join, and sort descriptions.
//!
//! Everything in this module is plain data. Compilation to SQL lives in
//! [`crate::sql::compiler`]; nothing here knows about a dialect.
//!
//! - [`Expression`] / [`DaoCriteria`] - same-store filters
//! - [`join`] - join expressions and per-store join criteria
//! - [`sort`] - sort orders across the stores of a chain

pub mod join;
pub mod sort;

use std::fmt;

use crate::value::Value;

pub use join::{JoinCriteria, JoinExpression, JoinOp, JoinType};
pub use sort::{JoinSortOrder, SortDirection};

/// How the members of a criteria list are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BooleanOperator {
    #[default]
    And,
    Or,
}

impl BooleanOperator {
    /// The operator De Morgan's law swaps this one for.
    pub fn flipped(self) -> Self {
        match self {
            BooleanOperator::And => BooleanOperator::Or,
            BooleanOperator::Or => BooleanOperator::And,
        }
    }
}

/// Comparison between a property and a literal or another property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    Greater,
    Lesser,
}

/// A geometry given as well-known text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub wkt: String,
    pub srid: Option<i64>,
}

impl Shape {
    pub fn wkt(wkt: &str) -> Self {
        Self {
            wkt: wkt.into(),
            srid: None,
        }
    }

    pub fn with_srid(mut self, srid: i64) -> Self {
        self.srid = Some(srid);
        self
    }
}

/// A node in a filter tree.
///
/// Every variant carries `matches`: `true` keeps rows the predicate accepts,
/// `false` keeps the complement. [`Expression::invert`] flips it without
/// changing the variant, so compilers keep using variant-specific templates.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Property equals one of `values`. An empty list matches nothing.
    InList {
        property: String,
        values: Vec<Value>,
        matches: bool,
    },

    /// Property geometry lies within `shape`.
    Within {
        property: String,
        shape: Shape,
        matches: bool,
    },

    /// Property compared to a literal.
    Compare {
        property: String,
        op: CompareOp,
        value: Value,
        matches: bool,
    },

    /// Property compared to another property.
    ///
    /// `other_alias` names another store of the chain; `None` means the same store.
    CompareProperty {
        property: String,
        op: CompareOp,
        other_alias: Option<String>,
        other_property: String,
        matches: bool,
    },

    /// Property is null.
    IsNull { property: String, matches: bool },

    /// Nested criteria with its own boolean operator.
    Group(DaoCriteria),
}

impl Expression {
    pub fn in_list<V: Into<Value>>(property: &str, values: impl IntoIterator<Item = V>) -> Self {
        Expression::InList {
            property: property.into(),
            values: values.into_iter().map(Into::into).collect(),
            matches: true,
        }
    }

    pub fn within(property: &str, shape: Shape) -> Self {
        Expression::Within {
            property: property.into(),
            shape,
            matches: true,
        }
    }

    pub fn equal(property: &str, value: impl Into<Value>) -> Self {
        Self::compare(property, CompareOp::Equal, value)
    }

    pub fn greater(property: &str, value: impl Into<Value>) -> Self {
        Self::compare(property, CompareOp::Greater, value)
    }

    pub fn lesser(property: &str, value: impl Into<Value>) -> Self {
        Self::compare(property, CompareOp::Lesser, value)
    }

    pub fn compare(property: &str, op: CompareOp, value: impl Into<Value>) -> Self {
        Expression::Compare {
            property: property.into(),
            op,
            value: value.into(),
            matches: true,
        }
    }

    /// Compare two properties of the same store.
    pub fn properties(property: &str, op: CompareOp, other_property: &str) -> Self {
        Expression::CompareProperty {
            property: property.into(),
            op,
            other_alias: None,
            other_property: other_property.into(),
            matches: true,
        }
    }

    /// Compare a property to a property of another store in the chain.
    pub fn other_store(property: &str, op: CompareOp, other_alias: &str, other_property: &str) -> Self {
        Expression::CompareProperty {
            property: property.into(),
            op,
            other_alias: Some(other_alias.into()),
            other_property: other_property.into(),
            matches: true,
        }
    }

    pub fn is_null(property: &str) -> Self {
        Expression::IsNull {
            property: property.into(),
            matches: true,
        }
    }

    /// `true` if this expression keeps matching rows, `false` if it keeps the complement.
    ///
    /// Groups always report `true`; their negation is pushed into the members.
    pub fn matches(&self) -> bool {
        match self {
            Expression::InList { matches, .. }
            | Expression::Within { matches, .. }
            | Expression::Compare { matches, .. }
            | Expression::CompareProperty { matches, .. }
            | Expression::IsNull { matches, .. } => *matches,
            Expression::Group(_) => true,
        }
    }

    /// The complementary expression, of the same variant.
    ///
    /// Groups are inverted by De Morgan: every member is inverted and the
    /// operator flips.
    pub fn invert(&self) -> Self {
        let mut inverted = self.clone();
        match &mut inverted {
            Expression::InList { matches, .. }
            | Expression::Within { matches, .. }
            | Expression::Compare { matches, .. }
            | Expression::CompareProperty { matches, .. }
            | Expression::IsNull { matches, .. } => *matches = !*matches,
            Expression::Group(criteria) => *criteria = criteria.invert(),
        }
        inverted
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = if self.matches() { "" } else { "NOT " };
        match self {
            Expression::InList {
                property, values, ..
            } => write!(f, "{}{} IN {:?}", not, property, values),
            Expression::Within {
                property, shape, ..
            } => write!(f, "{}{} WITHIN {}", not, property, shape.wkt),
            Expression::Compare {
                property,
                op,
                value,
                ..
            } => write!(f, "{}{} {:?} {}", not, property, op, value),
            Expression::CompareProperty {
                property,
                op,
                other_alias,
                other_property,
                ..
            } => match other_alias {
                Some(alias) => write!(f, "{}{} {:?} {}.{}", not, property, op, alias, other_property),
                None => write!(f, "{}{} {:?} {}", not, property, op, other_property),
            },
            Expression::IsNull { property, .. } => write!(f, "{}{} IS NULL", not, property),
            Expression::Group(criteria) => write!(f, "({})", criteria),
        }
    }
}

/// A list of expressions combined with one boolean operator.
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use = "builders have no effect until used"]
pub struct DaoCriteria {
    pub bool_op: BooleanOperator,
    pub expressions: Vec<Expression>,
}

impl DaoCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria whose members are ORed together.
    pub fn any() -> Self {
        Self {
            bool_op: BooleanOperator::Or,
            expressions: vec![],
        }
    }

    /// Criteria holding a single expression.
    pub fn with(expr: Expression) -> Self {
        Self::new().and(expr)
    }

    /// Append an expression (combined with this criteria's operator).
    pub fn and(mut self, expr: Expression) -> Self {
        self.expressions.push(expr);
        self
    }

    pub fn push(&mut self, expr: Expression) -> &mut Self {
        self.expressions.push(expr);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// De Morgan inverse: every member inverted, operator flipped.
    ///
    /// An empty AND-list (always true) becomes an empty OR-list (always false).
    pub fn invert(&self) -> Self {
        Self {
            bool_op: self.bool_op.flipped(),
            expressions: self.expressions.iter().map(Expression::invert).collect(),
        }
    }
}

impl fmt::Display for DaoCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = match self.bool_op {
            BooleanOperator::And => " AND ",
            BooleanOperator::Or => " OR ",
        };
        let parts: Vec<String> = self.expressions.iter().map(|e| e.to_string()).collect();
        f.write_str(&parts.join(sep))
    }
}

impl From<Expression> for DaoCriteria {
    fn from(expr: Expression) -> Self {
        DaoCriteria::with(expr)
    }
}
