//! Sort orders across the stores of a join chain.

use crate::mapping::ClassMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
    /// The property text is a SQL expression emitted verbatim.
    Computed,
}

/// One ORDER BY entry, naming the store it sorts on by alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSortOrder {
    pub alias: String,
    pub property: String,
    pub direction: SortDirection,
}

impl JoinSortOrder {
    pub fn asc(store: &ClassMapping, property: &str) -> Self {
        Self::new(store, property, SortDirection::Ascending)
    }

    pub fn desc(store: &ClassMapping, property: &str) -> Self {
        Self::new(store, property, SortDirection::Descending)
    }

    /// Sort by a raw SQL expression. Never build `expression` from user input.
    pub fn computed(store: &ClassMapping, expression: &str) -> Self {
        Self::new(store, expression, SortDirection::Computed)
    }

    pub fn new(store: &ClassMapping, property: &str, direction: SortDirection) -> Self {
        Self {
            alias: store.table().into(),
            property: property.into(),
            direction,
        }
    }

    /// Sort on the store registered under `alias` instead of the table name.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = alias.into();
        self
    }
}
