//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources so the download
//! orchestrator can be driven by Yahoo Finance in production and by a mock in
//! tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One OHLCV bar as delivered by a provider (monthly in this project).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Returns true if any price field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }
}

/// Bar spacing requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl Interval {
    /// Provider query-string token.
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI output as-is.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("invalid bar file {path}: {reason}")]
    InvalidBars { path: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

/// Trait for market-data providers.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the last `years` years of bars at `interval` spacing.
    fn fetch(&self, symbol: &str, years: u32, interval: Interval) -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}

/// Progress callback for multi-asset downloads.
pub trait DownloadProgress {
    /// Called when starting to fetch an asset.
    fn on_start(&self, asset: &str, index: usize, total: usize);

    /// Called when an asset's fetch-and-write completes.
    fn on_complete(&self, asset: &str, index: usize, total: usize, result: Result<(), &DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, asset: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {asset}...", index + 1, total);
    }

    fn on_complete(&self, asset: &str, _index: usize, _total: usize, result: Result<(), &DataError>) {
        match result {
            Ok(()) => println!("  OK: {asset}"),
            Err(e) => println!("  FAIL: {asset}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nDownload complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Progress reporter that stays silent.
pub struct NoProgress;

impl DownloadProgress for NoProgress {
    fn on_start(&self, _asset: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _asset: &str, _index: usize, _total: usize, _result: Result<(), &DataError>) {}
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
