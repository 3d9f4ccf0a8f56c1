//! Combined dataset assembly from per-asset bar files.
//!
//! Each asset contributes one row per bar after its first:
//! `Momentum` is the percent change of close against the previous bar and
//! `Volatility%` is the bar's high/low range relative to its low. Values are
//! rounded to two decimals.

use super::download::{bar_file_path, read_bars_csv, AssetSpec};
use super::provider::{DataError, PriceBar};
use crate::domain::{Month, MonthLocale};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const ASSEMBLED_HEADER: [&str; 6] = ["Date", "Asset", "Month", "Momentum", "Volatility%", "Volumen"];

/// One row of the combined dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRow {
    pub date: NaiveDate,
    pub asset: String,
    pub month: Month,
    pub momentum: Option<f64>,
    pub volatility_pct: Option<f64>,
    pub volume: u64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Percent change from `prev` to `close`. None when either is missing or `prev` is zero.
pub fn momentum(prev: f64, close: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    finite((close - prev) / prev * 100.0).map(round2)
}

/// High/low range as a percent of low.
pub fn volatility_pct(high: f64, low: f64) -> Option<f64> {
    if low == 0.0 {
        return None;
    }
    finite((high - low) / low * 100.0).map(round2)
}

/// Rows for one asset. Bars are ordered by date first; the earliest bar has
/// no predecessor and yields no row.
pub fn assemble_asset(asset: &str, bars: &[PriceBar]) -> Vec<AssembledRow> {
    let mut ordered: Vec<&PriceBar> = bars.iter().collect();
    ordered.sort_by_key(|b| b.date);

    ordered
        .windows(2)
        .map(|pair| {
            let (prev, bar) = (pair[0], pair[1]);
            AssembledRow {
                date: bar.date,
                asset: asset.to_string(),
                month: Month::from_date(bar.date),
                momentum: momentum(prev.close, bar.close),
                volatility_pct: volatility_pct(bar.high, bar.low),
                volume: bar.volume,
            }
        })
        .collect()
}

/// Rows for every asset, asset by asset in the given order.
pub fn assemble(assets: &[(String, Vec<PriceBar>)]) -> Vec<AssembledRow> {
    assets
        .iter()
        .flat_map(|(name, bars)| assemble_asset(name, bars))
        .collect()
}

/// Read `<dir>/<name><suffix>.csv` for each asset and assemble them.
pub fn assemble_from_dir(
    dir: &Path,
    assets: &[AssetSpec],
    suffix: &str,
) -> Result<Vec<AssembledRow>, DataError> {
    let mut loaded = Vec::with_capacity(assets.len());
    for asset in assets {
        let path = bar_file_path(dir, &asset.name, suffix);
        let bars = read_bars_csv(&path)?;
        tracing::debug!(asset = %asset.name, bars = bars.len(), "loaded bar file");
        loaded.push((asset.name.clone(), bars));
    }
    let rows = assemble(&loaded);
    tracing::info!(assets = assets.len(), rows = rows.len(), "assembled dataset");
    Ok(rows)
}

fn cell(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_default()
}

/// Write the combined dataset, semicolon-delimited.
pub fn write_assembled<W: Write>(writer: W, rows: &[AssembledRow]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    wtr.write_record(ASSEMBLED_HEADER)?;
    for row in rows {
        wtr.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.asset.clone(),
            row.month.label(MonthLocale::Spanish).to_string(),
            cell(row.momentum),
            cell(row.volatility_pct),
            row.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_assembled_csv(path: &Path, rows: &[AssembledRow]) -> Result<(), DataError> {
    let io_err = |e: &dyn std::fmt::Display| DataError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    let file = File::create(path).map_err(|e| io_err(&e))?;
    write_assembled(file, rows).map_err(|e| io_err(&e))
}
