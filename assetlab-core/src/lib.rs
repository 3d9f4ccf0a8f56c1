//! assetlab core: multi-asset monthly exploratory analysis.
//!
//! The pipeline runs in four sequential stages:
//! - Ingestion of a delimited table into a `RawTable`
//! - Normalization to canonical column names plus a derived month index
//! - Validation of the canonical schema and per-asset balance
//! - Descriptive summarization (describe, per-asset comparison, seasonality, correlation)
//!
//! Around it sit the market-data downloader, the assembler that derives the
//! combined dataset from per-asset bar files, and a deterministic sample
//! generator.

pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod pipeline;
pub mod report;
pub mod sample;

pub use config::PipelineConfig;
pub use pipeline::{run_pipeline, PipelineError, PipelineRun};
