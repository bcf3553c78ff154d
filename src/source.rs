//! Data-fetch collaborators.
//!
//! The pipeline only needs something that turns a procedure name plus
//! positional string parameters into materialized [`RawRow`]s. Sources own
//! whatever connection or file handle they need per call, so a single source
//! can serve independent report runs.

use std::{path::PathBuf, sync::OnceLock};

use anyhow::{Context, Result, bail};
use encoding_rs::{Encoding, UTF_8};
use itertools::Itertools;
use log::debug;
use regex::Regex;

use crate::{
    data::{RawRow, Scalar},
    io_utils,
};

pub trait RowSource {
    fn fetch(&self, procedure: &str, params: &[String]) -> Result<Vec<RawRow>>;
}

impl<T: RowSource + ?Sized> RowSource for &T {
    fn fetch(&self, procedure: &str, params: &[String]) -> Result<Vec<RawRow>> {
        (**self).fetch(procedure, params)
    }
}

impl<T: RowSource + ?Sized> RowSource for Box<T> {
    fn fetch(&self, procedure: &str, params: &[String]) -> Result<Vec<RawRow>> {
        (**self).fetch(procedure, params)
    }
}

/// Adapts a closure into a [`RowSource`].
pub struct FnSource<F> {
    fetch: F,
}

pub fn from_fn<F>(fetch: F) -> FnSource<F>
where
    F: Fn(&str, &[String]) -> Result<Vec<RawRow>>,
{
    FnSource { fetch }
}

impl<F> RowSource for FnSource<F>
where
    F: Fn(&str, &[String]) -> Result<Vec<RawRow>>,
{
    fn fetch(&self, procedure: &str, params: &[String]) -> Result<Vec<RawRow>> {
        (self.fetch)(procedure, params)
    }
}

fn procedure_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("procedure name pattern is valid")
    })
}

pub fn validate_procedure_name(name: &str) -> Result<()> {
    if !procedure_name_pattern().is_match(name) {
        bail!("Malformed procedure name '{name}'");
    }
    Ok(())
}

/// Renders the call statement with each parameter bound as a quoted literal.
pub fn procedure_call(name: &str, params: &[String]) -> String {
    let args = params
        .iter()
        .map(|param| format!("'{}'", param.replace('\'', "''")))
        .join(",");
    format!("CALL `{name}`({args})")
}

/// Serves procedure `p` from `<root>/p.csv`.
///
/// Fields are typed with [`Scalar::from_field`]; parameters are bound into
/// the logged call statement only.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    root: PathBuf,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
    has_headers: bool,
}

impl CsvRowSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delimiter: None,
            encoding: UTF_8,
            has_headers: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    fn resolve(&self, procedure: &str) -> Result<PathBuf> {
        for ext in ["csv", "tsv"] {
            let candidate = self.root.join(format!("{procedure}.{ext}"));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        bail!(
            "Procedure '{procedure}' does not exist under {:?}",
            self.root
        )
    }
}

impl RowSource for CsvRowSource {
    fn fetch(&self, procedure: &str, params: &[String]) -> Result<Vec<RawRow>> {
        validate_procedure_name(procedure)?;
        debug!("Executing {}", procedure_call(procedure, params));
        let path = self.resolve(procedure)?;
        let delimiter = io_utils::resolve_input_delimiter(&path, self.delimiter);
        let mut reader =
            io_utils::open_csv_reader(&path, delimiter, self.encoding, self.has_headers)?;
        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Reading row {idx} of {path:?}"))?;
            rows.push(RawRow::new(record.iter().map(Scalar::from_field).collect()));
        }
        debug!("Read {} row(s) from {:?}", rows.len(), path);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedure_call_quotes_and_escapes_parameters() {
        let params = vec!["2024-01-01".to_string(), "O'Brien".to_string()];
        assert_eq!(
            procedure_call("sp_sales", &params),
            "CALL `sp_sales`('2024-01-01','O''Brien')"
        );
    }

    #[test]
    fn procedure_names_must_be_identifiers() {
        assert!(validate_procedure_name("sp_reports_SalesRegister").is_ok());
        assert!(validate_procedure_name("../etc/passwd").is_err());
        assert!(validate_procedure_name("sp`; DROP").is_err());
        assert!(validate_procedure_name("").is_err());
    }

    #[test]
    fn closures_act_as_sources() {
        let source = from_fn(|procedure, params| {
            Ok(vec![RawRow::new(vec![
                Scalar::text(procedure),
                Scalar::from(params.len() as i64),
            ])])
        });
        let rows = source.fetch("sp", &["a".to_string()]).unwrap();
        assert_eq!(rows[0].value(0), &Scalar::text("sp"));
        assert_eq!(rows[0].value(1), &Scalar::from(1));
    }
}
