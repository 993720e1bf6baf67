//! Reading flat join rows back into typed records.
//!
//! A [`ResultLayout`] is built once per result set. It resolves every mapped
//! column of every store to a cursor ordinal using the store's column prefix,
//! so per-row work is plain indexed reads.

use std::collections::HashMap;

use crate::error::{DaoError, DaoResult};
use crate::mapping::RecordMapping;
use crate::sql::{JoinInfo, JoinQuery};
use crate::transport::{Row, RowCursor};

/// Cursor ordinals for one store.
#[derive(Debug)]
struct StoreLayout {
    alias: String,
    /// Ordinal of each mapped column, in mapping order.
    ordinals: Vec<usize>,
    /// Positions (into `ordinals`) deciding whether the store is present.
    presence: Vec<usize>,
}

/// Column ordinals of every store in one result set.
#[derive(Debug)]
pub(crate) struct ResultLayout {
    stores: Vec<StoreLayout>,
}

impl ResultLayout {
    /// Resolve each store's columns against the cursor's column names.
    pub(crate) fn new(columns: &[String], stores: &[JoinInfo], prefixes: &[String]) -> DaoResult<Self> {
        let mut by_name = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            by_name.entry(name.as_str()).or_insert(i);
        }

        let any_outer = stores
            .iter()
            .any(|s| s.join_type.is_some_and(|t| t.is_outer()));

        let mut layouts = Vec::with_capacity(stores.len());
        for (store, prefix) in stores.iter().zip(prefixes) {
            let mapping = &store.mapping;
            let mut ordinals = Vec::with_capacity(mapping.columns().len());
            for col in mapping.columns() {
                let name = format!("{}{}", prefix, col.column);
                let ordinal = by_name.get(name.as_str()).copied().or_else(|| {
                    columns.iter().position(|c| c.eq_ignore_ascii_case(&name))
                });
                match ordinal {
                    Some(ordinal) => ordinals.push(ordinal),
                    None => {
                        return Err(DaoError::MissingColumn {
                            store: store.alias.clone(),
                            property: col.property.clone(),
                            column: name,
                        })
                    }
                }
            }

            let presence: Vec<usize> = if mapping.has_identity() {
                mapping
                    .columns()
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.identity)
                    .map(|(i, _)| i)
                    .collect()
            } else {
                if any_outer {
                    tracing::warn!(
                        store = %store.alias,
                        table = mapping.table(),
                        "store has no identity columns; an all-null record reads as absent"
                    );
                }
                (0..ordinals.len()).collect()
            };

            layouts.push(StoreLayout {
                alias: store.alias.clone(),
                ordinals,
                presence,
            });
        }

        Ok(Self { stores: layouts })
    }
}

/// One row of a join result, readable store by store.
pub(crate) struct RowReader<'r> {
    row: &'r dyn Row,
    layout: &'r ResultLayout,
    query: &'r JoinQuery,
}

impl<'r> RowReader<'r> {
    pub(crate) fn new(row: &'r dyn Row, layout: &'r ResultLayout, query: &'r JoinQuery) -> Self {
        Self { row, layout, query }
    }

    /// Build the record of store `index`, or `None` if the row has no such record.
    pub(crate) fn read<T: Default + 'static>(
        &self,
        index: usize,
        records: &RecordMapping<T>,
    ) -> DaoResult<Option<T>> {
        let layout = &self.layout.stores[index];
        let wrap = |e| DaoError::execution(self.query.sql(), self.query.params(), e);

        let mut present = false;
        for &pos in &layout.presence {
            if !self.row.is_null(layout.ordinals[pos]).map_err(wrap)? {
                present = true;
                break;
            }
        }
        if !present {
            return Ok(None);
        }

        let mut record = T::default();
        for (pos, &ordinal) in layout.ordinals.iter().enumerate() {
            if self.row.is_null(ordinal).map_err(wrap)? {
                continue;
            }
            let value = self.row.value(ordinal).map_err(wrap)?;
            records
                .set(&mut record, pos, value)
                .map_err(|source| DaoError::Materialization {
                    store: layout.alias.clone(),
                    property: records.mapping().columns()[pos].property.clone(),
                    source,
                })?;
        }
        Ok(Some(record))
    }
}

/// Rows to skip, and how many results to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub start: usize,
    pub limit: Option<usize>,
}

impl Window {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: usize, limit: Option<usize>) -> Self {
        Self { start, limit }
    }
}

/// Drain `cursor` into `out`, building one result per accepted row.
pub(crate) fn collect<T>(
    cursor: &mut dyn RowCursor,
    query: &JoinQuery,
    stores: &[JoinInfo],
    window: Window,
    build: &dyn Fn(&RowReader<'_>) -> DaoResult<T>,
    out: &mut Vec<T>,
) -> DaoResult<()> {
    let layout = ResultLayout::new(cursor.columns(), stores, query.prefixes())?;
    if window.limit == Some(0) {
        tracing::trace!("limit is 0, not reading rows");
        return Ok(());
    }

    let mut seen = 0usize;
    while let Some(row) = cursor
        .next_row()
        .map_err(|e| DaoError::execution(query.sql(), query.params(), e))?
    {
        seen += 1;
        if seen <= window.start {
            tracing::trace!(row = seen, start = window.start, "skipping row before window");
            continue;
        }
        out.push(build(&RowReader::new(row, &layout, query))?);
        if window.limit.is_some_and(|limit| out.len() >= limit) {
            tracing::trace!(rows = out.len(), "window limit reached");
            break;
        }
    }
    Ok(())
}
