//! Summary rendering: plain text, Markdown and versioned JSON.
//!
//! The JSON document carries a `schema_version`; documents written by a newer
//! version are rejected on load.

use crate::analysis::Summary;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema version {found} (max supported: {max})")]
    UnsupportedVersion { found: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

/// Persisted form of a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub schema_version: u32,
    /// Where the data came from, when known.
    pub source: Option<String>,
    pub summary: Summary,
}

pub fn render(summary: &Summary, format: ReportFormat, source: Option<&str>) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(render_text(summary)),
        ReportFormat::Markdown => Ok(render_markdown(summary)),
        ReportFormat::Json => to_json(summary, source),
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn to_json(summary: &Summary, source: Option<&str>) -> Result<String, ReportError> {
    let doc = ReportDocument {
        schema_version: SCHEMA_VERSION,
        source: source.map(str::to_string),
        summary: summary.clone(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn from_json(json: &str) -> Result<ReportDocument, ReportError> {
    let doc: ReportDocument = serde_json::from_str(json)?;
    if doc.schema_version > SCHEMA_VERSION {
        return Err(ReportError::UnsupportedVersion {
            found: doc.schema_version,
            max: SCHEMA_VERSION,
        });
    }
    Ok(doc)
}

// ─── Text ───────────────────────────────────────────────────────────

fn num(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{x:.2}"),
        None => "-".into(),
    }
}

fn pct(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{:.0}%", x * 100.0),
        None => "-".into(),
    }
}

pub fn render_text(s: &Summary) -> String {
    let mut out = String::with_capacity(2048);
    let _ = writeln!(out, "Dataset: {} rows x {} columns", s.shape.0, s.shape.1);
    let _ = writeln!(out, "Fingerprint: {}", s.fingerprint);

    let _ = writeln!(out, "\nColumns:");
    for (col, (_, missing)) in s.columns.iter().zip(&s.missing) {
        let _ = writeln!(
            out,
            "  {:<18} {:>6} non-null  {:<8} {:>4} missing",
            col.name, col.non_null, col.kind, missing
        );
    }

    let _ = writeln!(out, "\nDescribe:");
    let _ = writeln!(
        out,
        "  {:<18} {:>6} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for d in &s.describe {
        let _ = writeln!(
            out,
            "  {:<18} {:>6} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
            d.column,
            d.count,
            num(d.mean),
            num(d.std),
            num(d.min),
            num(d.p25),
            num(d.median),
            num(d.p75),
            num(d.max)
        );
    }

    let _ = writeln!(out, "\nObservations per asset:");
    for (asset, n) in &s.asset_counts {
        let _ = writeln!(out, "  {asset:<10} {n}");
    }

    let _ = writeln!(out, "\nPer-asset comparison:");
    for a in &s.asset_stats {
        let _ = writeln!(
            out,
            "  {:<10} return mean {:>8} std {:>8} | range mean {:>8} max {:>8} | volume mean {}",
            a.asset,
            num(a.ret.mean),
            num(a.ret.std),
            num(a.volatility_range.mean),
            num(a.volatility_range.max),
            num(a.mean_volume)
        );
    }

    let _ = writeln!(out, "\nSeasonality (all assets):");
    for m in &s.seasonality {
        let _ = writeln!(
            out,
            "  {:<4} n={:<4} mean return {:>8}  positive {:>5}",
            m.month.to_string(),
            m.count,
            num(m.mean_return),
            pct(m.positive_share)
        );
    }

    let _ = writeln!(out, "\nCorrelation:");
    let _ = write!(out, "  {:<18}", "");
    for c in &s.correlation.columns {
        let _ = write!(out, " {c:>16}");
    }
    out.push('\n');
    for (c, row) in s.correlation.columns.iter().zip(&s.correlation.values) {
        let _ = write!(out, "  {c:<18}");
        for v in row {
            let _ = write!(out, " {v:>16.3}");
        }
        out.push('\n');
    }

    if !s.anomalies.is_empty() {
        let _ = writeln!(out, "\nAnomalies:");
        for a in &s.anomalies {
            let _ = writeln!(out, "  [{:?}] {:?} in {}: {}", a.severity, a.kind, a.column, a.count);
        }
    }

    out
}

// ─── Markdown ───────────────────────────────────────────────────────

pub fn render_markdown(s: &Summary) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str("# Exploratory Data Analysis\n\n");
    md.push_str("| Field | Value |\n| --- | --- |\n");
    let _ = writeln!(md, "| Rows | {} |", s.shape.0);
    let _ = writeln!(md, "| Columns | {} |", s.shape.1);
    let _ = writeln!(md, "| Fingerprint | `{}` |", s.fingerprint);
    md.push('\n');

    md.push_str("## Columns\n\n");
    md.push_str("| Column | Non-null | Type | Missing |\n| --- | ---: | --- | ---: |\n");
    for (col, (_, missing)) in s.columns.iter().zip(&s.missing) {
        let _ = writeln!(md, "| {} | {} | {} | {} |", col.name, col.non_null, col.kind, missing);
    }
    md.push('\n');

    md.push_str("## Descriptive Statistics\n\n");
    md.push_str("| Column | Count | Mean | Std | Min | 25% | 50% | 75% | Max |\n");
    md.push_str("| --- | ---: | ---: | ---: | ---: | ---: | ---: | ---: | ---: |\n");
    for d in &s.describe {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
            d.column,
            d.count,
            num(d.mean),
            num(d.std),
            num(d.min),
            num(d.p25),
            num(d.median),
            num(d.p75),
            num(d.max)
        );
    }
    md.push('\n');

    md.push_str("## Assets\n\n");
    md.push_str("| Asset | Rows | Mean Return | Return Std | Mean Range | Max Range | Mean Volume |\n");
    md.push_str("| --- | ---: | ---: | ---: | ---: | ---: | ---: |\n");
    for a in &s.asset_stats {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} | {} |",
            a.asset,
            a.count,
            num(a.ret.mean),
            num(a.ret.std),
            num(a.volatility_range.mean),
            num(a.volatility_range.max),
            num(a.mean_volume)
        );
    }
    md.push('\n');

    md.push_str("## Seasonality\n\n");
    md.push_str("| Month | Rows | Mean Return | Positive |\n| --- | ---: | ---: | ---: |\n");
    for m in &s.seasonality {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            m.month,
            m.count,
            num(m.mean_return),
            pct(m.positive_share)
        );
    }
    md.push('\n');

    md.push_str("## Correlation\n\n");
    md.push_str("| |");
    for c in &s.correlation.columns {
        let _ = write!(md, " {c} |");
    }
    md.push_str("\n| --- |");
    for _ in &s.correlation.columns {
        md.push_str(" ---: |");
    }
    md.push('\n');
    for (c, row) in s.correlation.columns.iter().zip(&s.correlation.values) {
        let _ = write!(md, "| {c} |");
        for v in row {
            let _ = write!(md, " {v:.3} |");
        }
        md.push('\n');
    }
    md.push('\n');

    md.push_str("## Anomalies\n\n");
    if s.anomalies.is_empty() {
        md.push_str("None detected.\n");
    } else {
        md.push_str("| Severity | Kind | Column | Count |\n| --- | --- | --- | ---: |\n");
        for a in &s.anomalies {
            let _ = writeln!(md, "| {:?} | {:?} | {} | {} |", a.severity, a.kind, a.column, a.count);
        }
    }

    md
}
