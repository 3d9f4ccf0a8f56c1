//! End-to-end analysis: ingest, normalize, validate, summarize.

use crate::analysis::{Summarizer, Summary, SummaryError};
use crate::config::PipelineConfig;
use crate::data::ingest::{DataIngestor, IngestError};
use crate::data::normalize::{NormalizeError, Normalizer};
use crate::data::validate::{check_schema, enforce_balance, ValidationError};
use crate::domain::{Dataset, RawTable};
use std::io::Read;
use std::path::Path;

/// A failure, labelled with the stage it happened in.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("ingestion: {0}")]
    Ingestion(#[from] IngestError),

    #[error("normalization: {0}")]
    Normalization(#[from] NormalizeError),

    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("summarization: {0}")]
    Summarization(#[from] SummaryError),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Ingestion(_) => "ingestion",
            PipelineError::Normalization(_) => "normalization",
            PipelineError::Validation(_) => "validation",
            PipelineError::Summarization(_) => "summarization",
        }
    }
}

/// Output of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub dataset: Dataset,
    pub summary: Summary,
}

pub fn run_pipeline(path: &Path, config: &PipelineConfig) -> Result<PipelineRun, PipelineError> {
    let raw = DataIngestor::new(config.ingest.clone()).ingest_path(path)?;
    tracing::info!(path = %path.display(), rows = raw.height(), "loaded input");
    run_table(raw, config)
}

pub fn run_reader<R: Read>(reader: R, config: &PipelineConfig) -> Result<PipelineRun, PipelineError> {
    let raw = DataIngestor::new(config.ingest.clone()).ingest_reader(reader)?;
    run_table(raw, config)
}

/// Run every stage after ingestion.
pub fn run_table(raw: RawTable, config: &PipelineConfig) -> Result<PipelineRun, PipelineError> {
    let dataset = Normalizer::new(config.normalize.clone()).normalize(raw)?;
    check_schema(&dataset, &config.schema)?;
    let dataset = enforce_balance(dataset, &config.schema, config.balance_policy)?;
    let summary = Summarizer::new(config.schema.clone()).summarize(&dataset)?;
    Ok(PipelineRun { dataset, summary })
}
