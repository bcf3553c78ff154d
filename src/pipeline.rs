//! Report orchestration: validate → fetch → map → filter → write.
//!
//! Each stage is a hard gate. The first failure is logged and returned as a
//! [`ReportError`]; no partially written sheet ever leaves this module.

use log::{debug, error, info, warn};

use crate::{
    columns::map_rows,
    config::ReportConfig,
    error::ReportError,
    filter::apply_filters,
    sheet::{SheetEncoder, XlsxEncoder, write_rows},
    source::RowSource,
};

pub struct ReportPipeline<S, E = XlsxEncoder> {
    source: S,
    encoder: E,
}

impl<S: RowSource> ReportPipeline<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            encoder: XlsxEncoder,
        }
    }
}

impl<S: RowSource, E: SheetEncoder> ReportPipeline<S, E> {
    pub fn with_encoder<E2: SheetEncoder>(self, encoder: E2) -> ReportPipeline<S, E2> {
        ReportPipeline {
            source: self.source,
            encoder,
        }
    }

    pub fn generate(&self, config: &ReportConfig) -> Result<Vec<u8>, ReportError> {
        let name = config.display_name();
        info!("Generating report '{name}'");
        let result = self.run(config);
        match &result {
            Ok(bytes) => info!("Generated report '{name}' ({} byte(s))", bytes.len()),
            Err(err) => error!("Report '{name}' failed: {err}"),
        }
        result
    }

    fn run(&self, config: &ReportConfig) -> Result<Vec<u8>, ReportError> {
        let (datasource, meta) = config.validate()?;
        let procedure = datasource.sp_name.as_str();

        let raw_rows = self
            .source
            .fetch(procedure, &datasource.sp_params)
            .map_err(|err| ReportError::DataAccess {
                procedure: procedure.to_string(),
                message: format!("{err:#}"),
            })?;
        if raw_rows.is_empty() {
            warn!("No data returned from the stored procedure '{procedure}'");
            return Err(ReportError::EmptyResult {
                procedure: procedure.to_string(),
            });
        }
        debug!("Fetched {} raw row(s) from '{procedure}'", raw_rows.len());

        if let Some(custom) = meta.custom.as_ref().filter(|custom| !custom.is_empty()) {
            debug!("Ignoring {} custom column definition(s)", custom.len());
        }

        let fixed = meta.fixed_or_empty();
        let mut rows = map_rows(&raw_rows, &fixed)?;
        drop(raw_rows);
        debug!("Mapped {} row(s) across {} fixed column(s)", rows.len(), fixed.len());

        apply_filters(&mut rows, meta.filters_or_empty(), &fixed)?;
        debug!("{} row(s) remain after filtering", rows.len());

        write_rows(&rows, &self.encoder)
    }
}

/// Generates an `.xlsx` report from `config`, fetching rows from `source`.
pub fn generate<S: RowSource>(config: &ReportConfig, source: S) -> Result<Vec<u8>, ReportError> {
    ReportPipeline::new(source).generate(config)
}
