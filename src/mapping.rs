//! Class mappings: how a record type maps onto a physical table.
//!
//! [`ClassMapping`] is pure metadata (table, columns, identity flags, declared
//! types). It is loaded once, wrapped in an `Arc`, and never mutated afterwards.
//!
//! [`RecordMapping`] binds a `ClassMapping` to a concrete Rust type by pairing
//! every mapped column with a typed field setter. The setter table is built once
//! per store and reused for every row.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DaoError, DaoResult};
use crate::value::{ColumnType, FromValue, Value, ValueError};

/// One mapped column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Property name used by criteria, join expressions, and sort orders.
    pub property: String,
    /// Physical column name.
    pub column: String,
    /// Declared database type; literals compared against this column are coerced to it.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether the column is part of the record identity.
    #[serde(default)]
    pub identity: bool,
}

impl ColumnMapping {
    pub fn new(property: &str, column: &str, column_type: ColumnType) -> Self {
        Self {
            property: property.into(),
            column: column.into(),
            column_type,
            identity: false,
        }
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }
}

/// Raw, deserializable form of a [`ClassMapping`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassMappingDef {
    pub table: String,
    pub columns: Vec<ColumnMapping>,
}

/// Table-level metadata for one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClassMappingDef", into = "ClassMappingDef")]
pub struct ClassMapping {
    table: String,
    columns: Vec<ColumnMapping>,
    by_property: HashMap<String, usize>,
}

impl ClassMapping {
    /// Start building a mapping for `table`.
    pub fn builder(table: &str) -> ClassMappingBuilder {
        ClassMappingBuilder {
            table: table.into(),
            columns: vec![],
        }
    }

    /// Validate and index a list of columns.
    ///
    /// Fails if the list is empty or a property/column name repeats.
    pub fn new(table: &str, columns: Vec<ColumnMapping>) -> DaoResult<Self> {
        if table.is_empty() {
            return Err(DaoError::config("A class mapping needs a table name"));
        }
        if columns.is_empty() {
            return Err(DaoError::config(format!(
                "Class mapping for table '{}' has no columns",
                table
            )));
        }
        let mut by_property = HashMap::with_capacity(columns.len());
        let mut seen_columns = std::collections::HashSet::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if by_property.insert(col.property.clone(), i).is_some() {
                return Err(DaoError::config(format!(
                    "Property '{}' is mapped twice on table '{}'",
                    col.property, table
                )));
            }
            if !seen_columns.insert(col.column.as_str()) {
                return Err(DaoError::config(format!(
                    "Column '{}' is mapped twice on table '{}'",
                    col.column, table
                )));
            }
        }
        Ok(Self {
            table: table.into(),
            columns,
            by_property,
        })
    }

    /// Physical table name. Also the default store alias.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// All mapped columns, in declaration order.
    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    /// Identity columns, in declaration order.
    pub fn identity_columns(&self) -> impl Iterator<Item = &ColumnMapping> {
        self.columns.iter().filter(|c| c.identity)
    }

    pub fn has_identity(&self) -> bool {
        self.columns.iter().any(|c| c.identity)
    }

    /// Look up a column by property name.
    pub fn column_for(&self, property: &str) -> Option<&ColumnMapping> {
        self.by_property.get(property).map(|&i| &self.columns[i])
    }

    /// Look up a column by property name, failing with a configuration error.
    pub fn require_column(&self, property: &str) -> DaoResult<&ColumnMapping> {
        self.column_for(property).ok_or_else(|| {
            DaoError::config(format!(
                "Table '{}' has no mapped property '{}'",
                self.table, property
            ))
        })
    }

    /// Position of a property in [`columns`](Self::columns).
    pub fn position(&self, property: &str) -> Option<usize> {
        self.by_property.get(property).copied()
    }
}

impl TryFrom<ClassMappingDef> for ClassMapping {
    type Error = DaoError;

    fn try_from(def: ClassMappingDef) -> Result<Self, Self::Error> {
        ClassMapping::new(&def.table, def.columns)
    }
}

impl From<ClassMapping> for ClassMappingDef {
    fn from(mapping: ClassMapping) -> Self {
        ClassMappingDef {
            table: mapping.table,
            columns: mapping.columns,
        }
    }
}

impl fmt::Display for ClassMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassMapping({})", self.table)
    }
}

/// Fluent builder for [`ClassMapping`].
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until built"]
pub struct ClassMappingBuilder {
    table: String,
    columns: Vec<ColumnMapping>,
}

impl ClassMappingBuilder {
    /// Add an identity column.
    pub fn identity(mut self, property: &str, column: &str, column_type: ColumnType) -> Self {
        self.columns
            .push(ColumnMapping::new(property, column, column_type).identity());
        self
    }

    /// Add a regular column.
    pub fn column(mut self, property: &str, column: &str, column_type: ColumnType) -> Self {
        self.columns
            .push(ColumnMapping::new(property, column, column_type));
        self
    }

    pub fn build(self) -> DaoResult<ClassMapping> {
        ClassMapping::new(&self.table, self.columns)
    }
}

// =============================================================================
// Record mapping
// =============================================================================

type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), ValueError> + Send + Sync>;

/// Typed setters for every column of a [`ClassMapping`].
///
/// ```ignore
/// let records = RecordMapping::<Person>::new(mapping)
///     .bind("ID", |p| &mut p.id)
///     .bind("Name", |p| &mut p.name);
/// ```
#[must_use = "record mappings have no effect until used by a Store"]
pub struct RecordMapping<T> {
    mapping: Arc<ClassMapping>,
    setters: Vec<Option<Setter<T>>>,
    unknown: Vec<String>,
}

impl<T: 'static> RecordMapping<T> {
    pub fn new(mapping: impl Into<Arc<ClassMapping>>) -> Self {
        let mapping = mapping.into();
        let setters = mapping.columns().iter().map(|_| None).collect();
        Self {
            mapping,
            setters,
            unknown: vec![],
        }
    }

    /// Bind a property to a field accessor.
    ///
    /// Unknown properties are reported by [`validate`](Self::validate).
    pub fn bind<F>(mut self, property: &str, field: fn(&mut T) -> &mut F) -> Self
    where
        F: FromValue + 'static,
    {
        match self.mapping.position(property) {
            Some(i) => {
                self.setters[i] = Some(Box::new(move |record: &mut T, value: Value| {
                    *field(record) = F::from_value(value)?;
                    Ok(())
                }));
            }
            None => self.unknown.push(property.to_string()),
        }
        self
    }
}

impl<T> RecordMapping<T> {
    /// Check that every mapped column has exactly one known setter.
    pub fn validate(&self) -> DaoResult<()> {
        if let Some(property) = self.unknown.first() {
            return Err(DaoError::config(format!(
                "{} has no property '{}' to bind",
                self.mapping, property
            )));
        }
        let unbound: Vec<&str> = self
            .mapping
            .columns()
            .iter()
            .zip(&self.setters)
            .filter(|(_, setter)| setter.is_none())
            .map(|(col, _)| col.property.as_str())
            .collect();
        if !unbound.is_empty() {
            return Err(DaoError::config(format!(
                "{} has unbound properties: {}",
                self.mapping,
                unbound.join(", ")
            )));
        }
        Ok(())
    }

    pub fn mapping(&self) -> &Arc<ClassMapping> {
        &self.mapping
    }

    /// Assign the value of column `index` onto `record`.
    pub(crate) fn set(&self, record: &mut T, index: usize, value: Value) -> Result<(), ValueError> {
        match self.setters.get(index).and_then(Option::as_ref) {
            Some(setter) => setter(record, value),
            None => Ok(()),
        }
    }
}

impl<T> fmt::Debug for RecordMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordMapping")
            .field("mapping", &self.mapping)
            .field("bound", &self.setters.iter().filter(|s| s.is_some()).count())
            .finish()
    }
}
