//! Positional-to-named column mapping.
//!
//! Every raw row is projected through the `fixed` column configuration: each
//! enabled column reads one raw position, formats it, and stores the text
//! under the column's output name. Rows that end up with no cells are dropped.

use indexmap::IndexMap;
use log::debug;

use crate::{
    config::FixedColumns,
    data::RawRow,
    error::ReportError,
    format::format_value,
};

/// A named-column record built from one raw row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MappedRow {
    source_index: usize,
    cells: IndexMap<String, String>,
}

impl MappedRow {
    pub fn new(source_index: usize) -> Self {
        Self {
            source_index,
            cells: IndexMap::new(),
        }
    }

    /// Builds a row from `(name, value)` pairs, mostly for callers that
    /// already hold named data.
    pub fn from_pairs<K, V, I>(source_index: usize, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            source_index,
            cells: pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Sets `name` to `value`; an existing cell keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cells.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Position of the raw row this record was built from.
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Maps every raw row through `fixed`, in `fixed`'s order.
///
/// Columns with a negative `mappedIndex` are skipped, positions past the end
/// of a raw row read as null, and rows that produce no cells are dropped.
pub fn map_rows(raw_rows: &[RawRow], fixed: &FixedColumns) -> Result<Vec<MappedRow>, ReportError> {
    let mut mapped = Vec::with_capacity(raw_rows.len());
    for (row_idx, raw) in raw_rows.iter().enumerate() {
        let row = map_row(row_idx, raw, fixed)?;
        if row.is_empty() {
            debug!("Row {row_idx} produced no mapped columns; dropping it");
            continue;
        }
        mapped.push(row);
    }
    Ok(mapped)
}

fn map_row(row_idx: usize, raw: &RawRow, fixed: &FixedColumns) -> Result<MappedRow, ReportError> {
    let mut row = MappedRow::new(row_idx);
    for (key, column) in fixed.iter() {
        let Some(position) = column.position() else {
            continue;
        };
        let text = format_value(raw.value(position), column.format.as_ref()).map_err(|source| {
            ReportError::Mapping {
                row: row_idx,
                column: key.to_string(),
                source,
            }
        })?;
        row.insert(column.name.as_str(), text);
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnConfig;

    #[test]
    fn insert_replaces_in_place() {
        let mut row = MappedRow::from_pairs(0, [("a", "1"), ("b", "2")]);
        row.insert("a", "3");
        assert_eq!(row.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get("a"), Some("3"));
    }

    #[test]
    fn out_of_range_positions_read_as_empty() {
        let fixed: FixedColumns = [("k".to_string(), ColumnConfig::new("Code", 5, None))]
            .into_iter()
            .collect();
        let raw: RawRow = ["only"].into_iter().collect();
        let mapped = map_rows(&[raw], &fixed).unwrap();
        assert_eq!(mapped[0].get("Code"), Some(""));
    }
}
