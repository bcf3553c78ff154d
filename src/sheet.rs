//! Spreadsheet serialization.
//!
//! [`SheetLayout`] fixes the header and cell grid from the mapped rows; a
//! [`SheetEncoder`] turns that grid into bytes. [`XlsxEncoder`] is the
//! default; [`CsvEncoder`] exists for plain-text exports.

use anyhow::{Context, Result};
use clap::ValueEnum;
use rust_xlsxwriter::Workbook;

use crate::{columns::MappedRow, error::ReportError};

pub const SHEET_NAME: &str = "report";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Header plus text cells, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetLayout {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetLayout {
    /// Takes the column order from the first row; cells a later row lacks
    /// are left blank.
    pub fn from_rows(rows: &[MappedRow]) -> Self {
        let Some(first) = rows.first() else {
            return Self::default();
        };
        let headers: Vec<String> = first.names().map(str::to_string).collect();
        let rows = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|header| row.get(header).unwrap_or_default().to_string())
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}

pub trait SheetEncoder {
    fn encode(&self, sheet: &SheetLayout) -> Result<Vec<u8>>;
}

impl<T: SheetEncoder + ?Sized> SheetEncoder for &T {
    fn encode(&self, sheet: &SheetLayout) -> Result<Vec<u8>> {
        (**self).encode(sheet)
    }
}

impl<T: SheetEncoder + ?Sized> SheetEncoder for Box<T> {
    fn encode(&self, sheet: &SheetLayout) -> Result<Vec<u8>> {
        (**self).encode(sheet)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn encoder(&self) -> Box<dyn SheetEncoder> {
        match self {
            OutputFormat::Xlsx => Box::new(XlsxEncoder),
            OutputFormat::Csv => Box::new(CsvEncoder::default()),
        }
    }
}

/// Writes a single worksheet with every cell stored as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxEncoder;

impl SheetEncoder for XlsxEncoder {
    fn encode(&self, sheet: &SheetLayout) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col_idx, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string(0, column_number(col_idx)?, header)?;
        }
        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_number = u32::try_from(row_idx + 1)
                .with_context(|| format!("Row {row_idx} exceeds the worksheet limit"))?;
            for (col_idx, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet.write_string(row_number, column_number(col_idx)?, value)?;
            }
        }

        let bytes = workbook
            .save_to_buffer()
            .context("Saving workbook to buffer")?;
        Ok(bytes)
    }
}

fn column_number(idx: usize) -> Result<u16> {
    u16::try_from(idx).with_context(|| format!("Column {idx} exceeds the worksheet limit"))
}

#[derive(Debug, Clone, Copy)]
pub struct CsvEncoder {
    pub delimiter: u8,
}

impl Default for CsvEncoder {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl SheetEncoder for CsvEncoder {
    fn encode(&self, sheet: &SheetLayout) -> Result<Vec<u8>> {
        if sheet.is_empty() {
            return Ok(Vec::new());
        }
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        writer.write_record(&sheet.headers)?;
        for row in &sheet.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("Flushing CSV output: {}", err.error()))
    }
}

/// Lays out `rows` and hands them to `encoder`.
pub fn write_rows<E: SheetEncoder>(rows: &[MappedRow], encoder: &E) -> Result<Vec<u8>, ReportError> {
    let layout = SheetLayout::from_rows(rows);
    encoder
        .encode(&layout)
        .map_err(|err| ReportError::Serialization(format!("{err:#}")))
}
