pub mod cli;
pub mod columns;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod format;
pub mod inspect;
pub mod io_utils;
pub mod pipeline;
pub mod response;
pub mod sheet;
pub mod source;

use std::{env, path::PathBuf, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, error, info};

use crate::{
    cli::{Cli, Commands},
    config::ReportConfig,
    pipeline::ReportPipeline,
    source::CsvRowSource,
};

pub use crate::{error::ReportError, pipeline::generate};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("dynamic_reports", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => handle_generate(&args),
        Commands::Inspect(args) => inspect::execute(&args),
    }
}

fn handle_generate(args: &cli::GenerateArgs) -> Result<()> {
    let config = ReportConfig::load(&args.config)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Running '{}' against {:?} (delimiter '{}')",
        config.display_name(),
        args.data_dir,
        args.delimiter
            .map(io_utils::printable_delimiter)
            .unwrap_or_else(|| "auto".into())
    );
    let source = CsvRowSource::new(&args.data_dir)
        .with_delimiter(args.delimiter)
        .with_encoding(encoding)
        .with_headers(!args.no_headers);
    let pipeline = ReportPipeline::new(source).with_encoder(args.format.encoder());

    let bytes = pipeline.generate(&config).map_err(|err| {
        error!("{}", err.payload().to_json());
        anyhow!(err)
    })?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("report.{}", args.format.extension())));
    io_utils::write_output(&output, &bytes)
        .with_context(|| format!("Writing report to {output:?}"))?;
    info!("Wrote {} byte(s) to {:?}", bytes.len(), output);
    Ok(())
}
