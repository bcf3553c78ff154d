//! I/O helpers for file-backed sources and report output.
//!
//! - **Encoding**: input labels resolve through `encoding_rs`, defaulting to
//!   UTF-8; non-UTF-8 input is transcoded while reading.
//! - **Delimiters**: extension-based detection (`.tsv` → tab) unless given.
//! - **stdout**: the `-` path convention writes to standard output.

use std::{
    fs::File,
    io::{self, BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Opens `path` as CSV, decoding from `encoding` into UTF-8.
pub fn open_csv_reader(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
    has_headers: bool,
) -> Result<csv::Reader<Box<dyn Read>>> {
    let file = BufReader::new(
        File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
    );
    let reader: Box<dyn Read> = if encoding == UTF_8 {
        Box::new(file)
    } else {
        Box::new(
            DecodeReaderBytesBuilder::new()
                .encoding(Some(encoding))
                .build(file),
        )
    };
    Ok(csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader))
}

/// Writes `bytes` to `path`, or to stdout when `path` is `-`.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if is_dash(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        return Ok(());
    }
    let mut file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    file.write_all(bytes)
        .with_context(|| format!("Writing output file {path:?}"))?;
    file.flush()?;
    Ok(())
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
