//! Download orchestrator: fetch each asset, write one bar file per asset.
//!
//! Bar files are comma-delimited with the header
//! `Date,Open,High,Low,Close,Adj Close,Volume`. Missing prices are written
//! as empty cells.

use super::provider::{DataError, DataProvider, DownloadProgress, Interval, PriceBar};
use chrono::NaiveDate;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const BAR_HEADER: [&str; 7] = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A named instrument and the provider symbol it is fetched under.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetSpec {
    pub name: String,
    pub symbol: String,
}

impl AssetSpec {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    /// Parse `NAME=SYMBOL`. Only the first `=` splits, so `Gold=GC=F` works.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (name, symbol) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=SYMBOL, got '{s}'"))?;
        let (name, symbol) = (name.trim(), symbol.trim());
        if name.is_empty() || symbol.is_empty() {
            return Err(format!("expected NAME=SYMBOL, got '{s}'"));
        }
        Ok(Self::new(name, symbol))
    }
}

/// Where and how bar files are written.
#[derive(Debug, Clone)]
pub struct DownloadRequest<'a> {
    pub assets: &'a [AssetSpec],
    pub years: u32,
    pub interval: Interval,
    pub out_dir: &'a Path,
    pub file_suffix: &'a str,
}

/// Path of the bar file for `asset` inside `dir`.
pub fn bar_file_path(dir: &Path, asset: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{asset}{suffix}.csv"))
}

/// Download every asset in order, writing one bar file each.
///
/// Failures are collected rather than aborting the batch, except that once
/// the provider reports itself unavailable the remaining assets are marked
/// as blocked without being requested.
pub fn download_assets(
    provider: &dyn DataProvider,
    request: &DownloadRequest<'_>,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = request.assets.len();
    let mut written = Vec::new();
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, asset) in request.assets.iter().enumerate() {
        progress.on_start(&asset.name, i, total);

        let result = download_single(provider, request, asset);
        progress.on_complete(&asset.name, i, total, result.as_ref().map(|_| ()));

        match result {
            Ok(path) => written.push((asset.name.clone(), path)),
            Err(e) => {
                tracing::warn!(asset = %asset.name, error = %e, "download failed");
                errors.push((asset.name.clone(), e));
            }
        }

        if !provider.is_available() {
            for rest in &request.assets[(i + 1)..] {
                errors.push((rest.name.clone(), DataError::CircuitBreakerTripped));
            }
            break;
        }
    }

    progress.on_batch_complete(written.len(), errors.len(), total);

    DownloadSummary {
        total,
        written,
        errors,
    }
}

fn download_single(
    provider: &dyn DataProvider,
    request: &DownloadRequest<'_>,
    asset: &AssetSpec,
) -> Result<PathBuf, DataError> {
    let fetched = provider.fetch(&asset.symbol, request.years, request.interval)?;
    let path = bar_file_path(request.out_dir, &asset.name, request.file_suffix);
    write_bars_csv(&path, &fetched.bars)?;
    tracing::info!(asset = %asset.name, path = %path.display(), bars = fetched.bars.len(), "saved bars");
    Ok(path)
}

/// Summary of a batch download.
#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    /// (asset name, file written), in request order.
    pub written: Vec<(String, PathBuf)>,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn succeeded(&self) -> usize {
        self.written.len()
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

fn io_err(path: &Path, e: impl std::fmt::Display) -> DataError {
    DataError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn price_cell(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

/// Write bars to `path`, creating parent directories as needed.
pub fn write_bars_csv(path: &Path, bars: &[PriceBar]) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let file = File::create(path).map_err(|e| io_err(path, e))?;
    write_bars(file, bars).map_err(|e| io_err(path, e))
}

/// Write bars as CSV to any writer.
pub fn write_bars<W: Write>(writer: W, bars: &[PriceBar]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(BAR_HEADER)?;
    for bar in bars {
        wtr.write_record([
            bar.date.format(DATE_FORMAT).to_string(),
            price_cell(bar.open),
            price_cell(bar.high),
            price_cell(bar.low),
            price_cell(bar.close),
            price_cell(bar.adj_close),
            bar.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a bar file written by [`write_bars_csv`].
pub fn read_bars_csv(path: &Path) -> Result<Vec<PriceBar>, DataError> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    read_bars(file).map_err(|reason| DataError::InvalidBars {
        path: path.display().to_string(),
        reason,
    })
}

/// Read bars from any reader. Empty price cells become NaN, an empty volume 0.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<PriceBar>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| e.to_string())?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| format!("missing column '{name}'"))
    };
    let idx: Vec<usize> = BAR_HEADER
        .iter()
        .map(|name| position(name))
        .collect::<Result<_, _>>()?;

    let mut bars = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        let line = row + 2;
        let cell = |i: usize| record.get(idx[i]).unwrap_or("");

        let date = NaiveDate::parse_from_str(cell(0), DATE_FORMAT)
            .map_err(|e| format!("line {line}: bad date '{}': {e}", cell(0)))?;
        let price = |i: usize| -> Result<f64, String> {
            let raw = cell(i);
            if raw.is_empty() {
                return Ok(f64::NAN);
            }
            raw.parse::<f64>()
                .map_err(|_| format!("line {line}: bad {} '{raw}'", BAR_HEADER[i]))
        };
        let volume = match cell(6) {
            "" => 0,
            raw => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as u64)
                .ok_or_else(|| format!("line {line}: bad Volume '{raw}'"))?,
        };

        bars.push(PriceBar {
            date,
            open: price(1)?,
            high: price(2)?,
            low: price(3)?,
            close: price(4)?,
            adj_close: price(5)?,
            volume,
        });
    }
    Ok(bars)
}
