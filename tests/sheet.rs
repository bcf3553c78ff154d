mod common;

use common::read_sheet;
use dynamic_reports::columns::MappedRow;
use dynamic_reports::error::ReportError;
use dynamic_reports::sheet::{CsvEncoder, SheetEncoder, SheetLayout, XlsxEncoder, write_rows};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn xlsx_has_header_row_then_data_rows() {
    let rows = vec![
        MappedRow::from_pairs(0, [("Code", "X1"), ("Name", "Alpha")]),
        MappedRow::from_pairs(1, [("Code", "X2"), ("Name", "Beta")]),
    ];
    let bytes = write_rows(&rows, &XlsxEncoder).unwrap();
    assert_eq!(
        read_sheet(&bytes),
        vec![
            strings(&["Code", "Name"]),
            strings(&["X1", "Alpha"]),
            strings(&["X2", "Beta"]),
        ]
    );
}

#[test]
fn numbers_are_written_as_text_cells() {
    let rows = vec![MappedRow::from_pairs(0, [("Amount", "0012.50")])];
    let bytes = write_rows(&rows, &XlsxEncoder).unwrap();
    assert_eq!(read_sheet(&bytes)[1], strings(&["0012.50"]));
}

#[test]
fn empty_strings_leave_blank_cells() {
    let rows = vec![
        MappedRow::from_pairs(0, [("Code", ""), ("Name", "Alpha")]),
        MappedRow::from_pairs(1, [("Code", "X2"), ("Name", "")]),
    ];
    let bytes = write_rows(&rows, &XlsxEncoder).unwrap();
    assert_eq!(
        read_sheet(&bytes),
        vec![
            strings(&["Code", "Name"]),
            strings(&["", "Alpha"]),
            strings(&["X2", ""]),
        ]
    );
}

#[test]
fn no_rows_still_produce_a_readable_workbook() {
    let bytes = write_rows(&[], &XlsxEncoder).unwrap();
    assert!(!bytes.is_empty());
    assert!(read_sheet(&bytes).is_empty());
}

#[test]
fn csv_encoder_shares_the_layout() {
    let rows = vec![
        MappedRow::from_pairs(0, [("Code", "X1"), ("Name", "Alpha")]),
        MappedRow::from_pairs(1, [("Name", "Beta")]),
    ];
    let bytes = write_rows(&rows, &CsvEncoder { delimiter: b';' }).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "Code;Name\nX1;Alpha\n;Beta\n");
}

struct BrokenEncoder;

impl SheetEncoder for BrokenEncoder {
    fn encode(&self, _sheet: &SheetLayout) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("disk full")
    }
}

#[test]
fn encoder_failures_become_serialization_errors() {
    let rows = vec![MappedRow::from_pairs(0, [("Code", "X1")])];
    let err = write_rows(&rows, &BrokenEncoder).unwrap_err();
    assert_eq!(err, ReportError::Serialization("disk full".to_string()));
}
