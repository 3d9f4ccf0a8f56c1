//! Data ingestion, normalization, validation, download and assembly

pub mod assemble;
pub mod circuit_breaker;
pub mod download;
pub mod ingest;
pub mod normalize;
pub mod provider;
pub mod schema;
pub mod validate;
pub mod yahoo;

pub use assemble::{assemble, assemble_from_dir, write_assembled_csv, AssembledRow};
pub use circuit_breaker::CircuitBreaker;
pub use download::{download_assets, AssetSpec, DownloadRequest, DownloadSummary};
pub use ingest::{DataIngestor, IngestError, IngestOptions};
pub use normalize::{DropPolicy, NormalizeConfig, NormalizeError, Normalizer};
pub use provider::{DataError, DataProvider, DownloadProgress, Interval, PriceBar, StdoutProgress};
pub use schema::{CanonicalSchema, SchemaError};
pub use validate::{BalancePolicy, ValidationError};
pub use yahoo::{HttpSettings, YahooProvider};
