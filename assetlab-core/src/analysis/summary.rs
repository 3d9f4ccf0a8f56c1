//! Descriptive summarization of a normalized dataset.

use super::correlation::{correlation_matrix, CorrelationMatrix};
use super::describe::{column_info, describe, missing_counts, ColumnInfo, DescribeStats};
use super::group::value_counts;
use super::seasonality::{month_profile, MonthProfile};
use super::stats::SeriesStats;
use super::SummaryError;
use crate::data::schema::CanonicalSchema;
use crate::data::validate::{detect_anomalies, Anomaly};
use crate::domain::{AssetName, Dataset};
use crate::fingerprint::dataset_fingerprint;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-asset comparison figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStats {
    pub asset: AssetName,
    pub count: usize,
    #[serde(rename = "return")]
    pub ret: SeriesStats,
    pub volatility_range: SeriesStats,
    pub mean_volume: Option<f64>,
}

/// Everything the presentation layer needs, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// (rows, columns)
    pub shape: (usize, usize),
    pub columns: Vec<ColumnInfo>,
    /// Missing cells per column, every column listed.
    pub missing: Vec<(String, usize)>,
    pub describe: Vec<DescribeStats>,
    /// Rows per asset, in order of first appearance.
    pub asset_counts: Vec<(AssetName, usize)>,
    pub asset_stats: Vec<AssetStats>,
    pub seasonality: Vec<MonthProfile>,
    pub correlation: CorrelationMatrix,
    pub anomalies: Vec<Anomaly>,
    pub fingerprint: String,
}

impl Summary {
    pub fn missing_for(&self, column: &str) -> Option<usize> {
        self.missing.iter().find(|(c, _)| c == column).map(|(_, n)| *n)
    }

    pub fn count_for(&self, asset: &str) -> Option<usize> {
        self.asset_counts
            .iter()
            .find(|(a, _)| a == asset)
            .map(|(_, n)| *n)
    }
}

/// Computes a `Summary`. Borrows the dataset; never mutates it.
pub struct Summarizer {
    schema: CanonicalSchema,
}

impl Summarizer {
    pub fn new(schema: CanonicalSchema) -> Self {
        Self { schema }
    }

    pub fn summarize(&self, dataset: &Dataset) -> Result<Summary, SummaryError> {
        self.schema.validate(dataset.table())?;
        if dataset.height() == 0 {
            return Err(SummaryError::InsufficientData {
                reason: "dataset has no rows".into(),
            });
        }

        let correlation = correlation_matrix(dataset, &self.schema)?;
        let asset_counts = value_counts(dataset, &self.schema.asset)?;

        let asset_stats = asset_counts
            .iter()
            .map(|(asset, count)| self.asset_stats(dataset, asset, *count))
            .collect::<Result<Vec<_>, _>>()?;

        let seasonality = month_profile(dataset, &self.schema.month_index, &self.schema.ret)?;

        let summary = Summary {
            shape: dataset.shape(),
            columns: column_info(dataset),
            missing: missing_counts(dataset),
            describe: describe(dataset)?,
            asset_counts,
            asset_stats,
            seasonality,
            correlation,
            anomalies: detect_anomalies(dataset, &self.schema),
            fingerprint: dataset_fingerprint(dataset),
        };

        tracing::info!(
            rows = summary.shape.0,
            columns = summary.shape.1,
            assets = summary.asset_counts.len(),
            "summarized dataset"
        );
        Ok(summary)
    }

    fn asset_stats(
        &self,
        dataset: &Dataset,
        asset: &str,
        count: usize,
    ) -> Result<AssetStats, SummaryError> {
        let rows = Dataset::from_frame(
            dataset
                .frame()
                .clone()
                .lazy()
                .filter(col(self.schema.asset.as_str()).eq(lit(asset)))
                .collect()?,
        );

        Ok(AssetStats {
            asset: asset.to_string(),
            count,
            ret: SeriesStats::of(&rows.numeric(&self.schema.ret)?),
            volatility_range: SeriesStats::of(&rows.numeric(&self.schema.volatility_range)?),
            mean_volume: rows.numeric(&self.schema.volume)?.mean(),
        })
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(CanonicalSchema::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ingest::DataIngestor;
    use crate::data::normalize::Normalizer;

    const RAW: &str = "\
Date;Asset;Month;Momentum;Volatility%;Volumen
2024-01-01;SP500;ene;1.5;4.0;1000
2024-02-01;SP500;feb;-2.0;5.0;1100
2024-03-01;SP500;mar;3.0;3.5;900
2024-01-01;BTC;ene;10.0;20.0;5000
2024-02-01;BTC;feb;-8.0;25.0;6000
2024-03-01;BTC;mar;4.0;18.0;
";

    fn dataset() -> Dataset {
        let raw = DataIngestor::default()
            .ingest_reader(RAW.as_bytes())
            .unwrap();
        Normalizer::default().normalize(raw).unwrap()
    }

    #[test]
    fn summary_reports_shape_counts_and_missing() {
        let s = Summarizer::default().summarize(&dataset()).unwrap();
        assert_eq!(s.shape, (6, 6));
        assert_eq!(
            s.asset_counts,
            vec![("SP500".to_string(), 3), ("BTC".to_string(), 3)]
        );
        assert_eq!(s.missing_for("volume"), Some(1));
        assert_eq!(s.missing_for("return"), Some(0));
        assert_eq!(s.missing.len(), 6);
    }

    #[test]
    fn asset_stats_split_by_asset() {
        let s = Summarizer::default().summarize(&dataset()).unwrap();
        let btc = s.asset_stats.iter().find(|a| a.asset == "BTC").unwrap();
        assert_eq!(btc.ret.mean, Some(2.0));
        assert_eq!(btc.volatility_range.max, Some(25.0));
        assert_eq!(btc.mean_volume, Some(5500.0));
    }

    #[test]
    fn correlation_covers_canonical_numeric_columns() {
        let s = Summarizer::default().summarize(&dataset()).unwrap();
        assert_eq!(
            s.correlation.columns,
            vec!["return", "volume", "volatility_range", "month_index"]
        );
    }

    #[test]
    fn unconfigured_numeric_column_does_not_enter_the_matrix() {
        let text = RAW
            .lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    format!("{line};Close")
                } else {
                    format!("{line};")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let raw = DataIngestor::default().ingest_reader(text.as_bytes()).unwrap();
        let ds = Normalizer::default().normalize(raw).unwrap();
        assert!(ds.column("Close").is_some());

        let s = Summarizer::default().summarize(&ds).unwrap();
        assert_eq!(s.correlation.len(), 4);
        assert_eq!(s.missing_for("Close"), Some(6));
    }

    #[test]
    fn empty_dataset_is_insufficient_data() {
        let header = RAW.lines().next().unwrap();
        let raw = DataIngestor::default().ingest_reader(header.as_bytes()).unwrap();
        let ds = Normalizer::default().normalize(raw).unwrap();
        assert!(matches!(
            Summarizer::default().summarize(&ds),
            Err(SummaryError::InsufficientData { .. })
        ));
    }

    #[test]
    fn summarize_twice_is_identical() {
        let ds = dataset();
        let a = Summarizer::default().summarize(&ds).unwrap();
        let b = Summarizer::default().summarize(&ds).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seasonality_lists_present_months() {
        let s = Summarizer::default().summarize(&dataset()).unwrap();
        assert_eq!(s.seasonality.len(), 3);
        assert_eq!(s.seasonality[1].mean_return, Some(-5.0));
    }
}
