//! Preconditions between normalization and summarization.
//!
//! The comparison across assets only makes sense when the canonical schema is
//! complete and every asset contributes the same number of months. Both are
//! checked here, before any statistic is computed.

use crate::analysis::group::value_counts;
use crate::data::schema::{CanonicalSchema, SchemaError};
use crate::domain::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do when assets have different observation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Abort with `ValidationError::Imbalanced`.
    #[default]
    Fail,
    /// Keep the most recent N rows of every asset, N being the shortest count.
    TruncateToShortest,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("assets have unequal observation counts: {}", format_counts(.counts))]
    Imbalanced { counts: Vec<(String, usize)> },

    #[error("dataset has no labelled assets")]
    NoAssets,
}

fn format_counts(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .map(|(asset, n)| format!("{asset}={n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every canonical column present with its expected kind.
pub fn check_schema(dataset: &Dataset, schema: &CanonicalSchema) -> Result<(), ValidationError> {
    schema.validate(dataset.table())?;
    Ok(())
}

/// Enforce equal per-asset row counts according to `policy`.
///
/// An empty dataset has nothing to balance and passes through; the
/// summarizer reports it as insufficient data.
pub fn enforce_balance(
    dataset: Dataset,
    schema: &CanonicalSchema,
    policy: BalancePolicy,
) -> Result<Dataset, ValidationError> {
    if dataset.height() == 0 {
        return Ok(dataset);
    }

    let counts = value_counts(&dataset, &schema.asset)?;
    let shortest = counts
        .iter()
        .map(|(_, n)| *n)
        .min()
        .ok_or(ValidationError::NoAssets)?;

    if counts.iter().all(|(_, n)| *n == shortest) {
        return Ok(dataset);
    }

    match policy {
        BalancePolicy::Fail => Err(ValidationError::Imbalanced { counts }),
        BalancePolicy::TruncateToShortest => {
            tracing::warn!(
                counts = %format_counts(&counts),
                keep = shortest,
                "truncating every asset to its most recent observations"
            );
            let keep = most_recent_rows(&dataset, &schema.asset, &counts, shortest)?;
            Ok(dataset.take_rows(&keep)?)
        }
    }
}

/// Indices, in file order, of the last `keep` rows of every asset.
fn most_recent_rows(
    dataset: &Dataset,
    asset_column: &str,
    counts: &[(String, usize)],
    keep: usize,
) -> Result<Vec<usize>, SchemaError> {
    let labels = dataset.text(asset_column)?;
    let mut skip: HashMap<&str, usize> = counts
        .iter()
        .map(|(asset, n)| (asset.as_str(), n - keep))
        .collect();

    let mut rows = Vec::with_capacity(keep * counts.len());
    for (i, label) in labels.into_iter().enumerate() {
        let Some(remaining) = label.and_then(|l| skip.get_mut(l)) else {
            continue;
        };
        if *remaining == 0 {
            rows.push(i);
        } else {
            *remaining -= 1;
        }
    }
    Ok(rows)
}

/// Data-quality finding that does not stop the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub column: String,
    pub count: usize,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    MissingValues,
    NegativeVolume,
    ZeroVolume,
    NegativeRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// Scan a dataset for suspicious values.
pub fn detect_anomalies(dataset: &Dataset, schema: &CanonicalSchema) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for column in dataset.frame().get_columns() {
        let nulls = column.null_count();
        if nulls > 0 {
            anomalies.push(Anomaly {
                kind: AnomalyKind::MissingValues,
                column: column.name().to_string(),
                count: nulls,
                severity: Severity::Warning,
            });
        }
    }

    let count_where = |name: &str, pred: fn(f64) -> bool| -> usize {
        dataset
            .numeric(name)
            .map(|values| values.into_iter().flatten().filter(|v| pred(*v)).count())
            .unwrap_or(0)
    };

    let checks: [(&str, AnomalyKind, fn(f64) -> bool, Severity); 3] = [
        (&schema.volume, AnomalyKind::NegativeVolume, |v| v < 0.0, Severity::Warning),
        (&schema.volume, AnomalyKind::ZeroVolume, |v| v == 0.0, Severity::Info),
        (
            &schema.volatility_range,
            AnomalyKind::NegativeRange,
            |v| v < 0.0,
            Severity::Warning,
        ),
    ];

    for (column, kind, pred, severity) in checks {
        let count = count_where(column, pred);
        if count > 0 {
            anomalies.push(Anomaly {
                kind,
                column: column.to_string(),
                count,
                severity,
            });
        }
    }

    anomalies
}
