use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::sheet::OutputFormat;

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate spreadsheet reports from declarative configurations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a report configuration against a data directory and write the sheet
    Generate(GenerateArgs),
    /// Show the column plan, filters and procedure call of a configuration
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Report configuration (JSON, or YAML with a .yaml/.yml extension)
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Directory holding one `<procedure>.csv` file per stored procedure
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: PathBuf,
    /// Output file (`-` for stdout; defaults to report.<format>)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long = "format", value_enum, default_value = "xlsx")]
    pub format: OutputFormat,
    /// Delimiter of the data files (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the data files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Treat the first line of each data file as a data row
    #[arg(long = "no-headers")]
    pub no_headers: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Report configuration (JSON, or YAML with a .yaml/.yml extension)
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
