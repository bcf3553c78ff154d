#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx};
use dynamic_reports::config::{ColumnConfig, FixedColumns};
use dynamic_reports::format::FormatSpec;
use dynamic_reports::sheet::SHEET_NAME;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds a `fixed` map from `(key, name, mappedIndex, format)` tuples.
pub fn fixed(columns: &[(&str, &str, i64, Option<&str>)]) -> FixedColumns {
    columns
        .iter()
        .map(|(key, name, index, format)| {
            let spec = format.map(|f| FormatSpec::parse(f).expect("valid format spec"));
            (key.to_string(), ColumnConfig::new(*name, *index, spec))
        })
        .collect()
}

/// Reads the `report` worksheet back as text, one vector per row.
pub fn read_sheet(bytes: &[u8]) -> Vec<Vec<String>> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes.to_vec())).expect("generated bytes are an xlsx workbook");
    assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);
    let range = workbook
        .worksheet_range(SHEET_NAME)
        .expect("report worksheet");
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

pub const SALES_CONFIG: &str = r#"{
    "name": "outward",
    "datasource": { "spName": "sp_reports_sales", "spParams": ["2024-01-01", "2024-03-31"] },
    "meta": {
        "fixed": {
            "c_invoice": { "name": "Invoice", "mappedIndex": 0 },
            "c_customer": { "name": "Customer", "mappedIndex": 1, "format": "uppercase" },
            "c_date": { "name": "Invoice Date", "mappedIndex": 2, "format": "yyyy-MM-dd" },
            "c_amount": { "name": "Amount", "mappedIndex": 3 },
            "c_internal": { "name": "Internal", "mappedIndex": -1 }
        },
        "custom": { "x": { "mappedTo": "Amount", "name": "Total", "action": "sum" } },
        "filters": [ { "column": "c_amount", "condition": ">", "value": "100" } ]
    }
}"#;

pub const SALES_CSV: &str = "\
invoice,customer,invoice_date,amount
INV-1,acme ltd,15/01/2024,250
INV-2,globex,20/02/2024,75
INV-3,initech,not recorded,1200
";
