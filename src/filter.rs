use std::cmp::Ordering;

use log::{debug, warn};

use crate::{
    columns::MappedRow,
    config::{FilterCondition, FixedColumns, Filter},
    data::Scalar,
    error::ReportError,
};

/// Removes rows according to `filters`, applied in order.
///
/// A filter names a `fixed` key; the matching column's output name is used
/// to read each row. Filters with no matching key, a disabled column, or an
/// unsupported condition leave the rows untouched.
pub fn apply_filters(
    rows: &mut Vec<MappedRow>,
    filters: &[Filter],
    fixed: &FixedColumns,
) -> Result<(), ReportError> {
    for filter in filters {
        let Some(column) = fixed.get(&filter.column) else {
            warn!(
                "Filter column '{}' does not match any fixed column; skipping",
                filter.column
            );
            continue;
        };
        if column.position().is_none() {
            warn!(
                "Filter column '{}' is disabled (mappedIndex {}); skipping",
                filter.column, column.mapped_index
            );
            continue;
        }
        if let FilterCondition::Unsupported(raw) = &filter.condition {
            warn!("Unsupported filter condition '{raw}' on '{}'; skipping", filter.column);
            continue;
        }
        let before = rows.len();
        apply_filter(rows, filter, &column.name)?;
        debug!(
            "Filter '{} {} {}' removed {} row(s)",
            filter.column,
            filter.condition,
            filter.value,
            before - rows.len()
        );
    }
    Ok(())
}

fn apply_filter(rows: &mut Vec<MappedRow>, filter: &Filter, name: &str) -> Result<(), ReportError> {
    let keep = rows
        .iter()
        .map(|row| evaluate(filter, row, name))
        .collect::<Result<Vec<bool>, ReportError>>()?;
    let mut flags = keep.into_iter();
    rows.retain(|_| flags.next().unwrap_or(true));
    Ok(())
}

/// Returns `true` when `row` survives `filter`.
fn evaluate(filter: &Filter, row: &MappedRow, name: &str) -> Result<bool, ReportError> {
    let cell = row.get(name).unwrap_or("");
    match &filter.condition {
        FilterCondition::Contains => Ok(!filter.value.contains(cell)),
        FilterCondition::GreaterThan => {
            Ok(compare_cell(filter, row, cell)? == Ordering::Greater)
        }
        FilterCondition::LessThan => Ok(compare_cell(filter, row, cell)? == Ordering::Less),
        FilterCondition::Unsupported(_) => Ok(true),
    }
}

fn compare_cell(filter: &Filter, row: &MappedRow, cell: &str) -> Result<Ordering, ReportError> {
    let left = Scalar::infer_comparable(cell);
    let right = Scalar::infer_comparable(&filter.value);
    left.compare(&right).ok_or_else(|| ReportError::FilterType {
        row: row.source_index(),
        column: filter.column.clone(),
        message: format!(
            "cannot compare {} value '{cell}' with {} value '{}'",
            left.type_name(),
            right.type_name(),
            filter.value
        ),
    })
}
