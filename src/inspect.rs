//! Configuration inspection.
//!
//! Loads a report configuration and prints what a run would do with it: the
//! resolved column plan, how each filter binds, and the procedure call.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::InspectArgs,
    config::{FilterCondition, ReportConfig},
    source::procedure_call,
};

pub fn execute(args: &InspectArgs) -> Result<()> {
    let config = ReportConfig::load(&args.config)?;
    let rendered = render(&config).with_context(|| format!("Inspecting {:?}", args.config))?;
    print!("{rendered}");
    info!("Inspected report '{}'", config.display_name());
    Ok(())
}

/// Renders the plan for `config` as plain text.
pub fn render(config: &ReportConfig) -> Result<String> {
    let (datasource, meta) = config.validate()?;
    let fixed = meta.fixed_or_empty();
    let mut out = String::new();

    writeln!(out, "report: {}", config.display_name())?;
    writeln!(
        out,
        "call: {}",
        procedure_call(&datasource.sp_name, &datasource.sp_params)
    )?;
    writeln!(out)?;

    let mut rows = Vec::with_capacity(fixed.len());
    for (key, column) in fixed.iter() {
        let format = column
            .format
            .as_ref()
            .map(|spec| format!("{} ({})", spec, spec.kind()))
            .unwrap_or_default();
        let state = if column.position().is_some() {
            "mapped"
        } else {
            "skipped"
        };
        rows.push(vec![
            key.to_string(),
            column.name.clone(),
            column.mapped_index.to_string(),
            format,
            state.to_string(),
        ]);
    }
    let headers = ["key", "name", "index", "format", "state"];
    out.push_str(&render_grid(&headers, &rows));

    let filters = meta.filters_or_empty();
    if !filters.is_empty() {
        writeln!(out)?;
        for filter in filters {
            let binding = match fixed.get(&filter.column) {
                Some(column) if column.position().is_none() => "ignored: column skipped".to_string(),
                Some(column) => format!("-> {}", column.name),
                None => "ignored: no such column".to_string(),
            };
            let note = if let FilterCondition::Unsupported(_) = filter.condition {
                " (unsupported condition)"
            } else {
                ""
            };
            writeln!(
                out,
                "filter: {} {} '{}' {binding}{note}",
                filter.column, filter.condition, filter.value
            )?;
        }
    }
    if let Some(custom) = meta.custom.as_ref().filter(|custom| !custom.is_empty()) {
        writeln!(out)?;
        writeln!(out, "custom columns (not evaluated): {}", custom.len())?;
    }
    Ok(out)
}

fn render_grid(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = grid_line(&header_cells, &widths);
    out.push_str(&grid_line(&separator, &widths));
    for row in rows {
        out.push_str(&grid_line(row, &widths));
    }
    out
}

fn grid_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}", width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}
