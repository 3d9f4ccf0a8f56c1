//! Numeric helpers shared by the summaries, over polars `Float64` columns.
//!
//! Missing cells are skipped. Every helper reads its input in row order, so
//! repeated calls on the same column give bit-identical results.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of present values.
pub fn present(values: &Float64Chunked) -> usize {
    values.len() - values.null_count()
}

/// Sample standard deviation (n - 1 denominator); undefined below two values.
pub fn sample_std(values: &Float64Chunked) -> Option<f64> {
    if present(values) < 2 {
        return None;
    }
    values.std(1).filter(|s| s.is_finite())
}

/// Linear-interpolated quantile.
pub fn quantile(values: &Float64Chunked, q: f64) -> PolarsResult<Option<f64>> {
    values.quantile(q, QuantileMethod::Linear)
}

/// Location and spread of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SeriesStats {
    pub fn of(values: &Float64Chunked) -> Self {
        Self {
            count: present(values),
            mean: values.mean(),
            std: sample_std(values),
            min: values.min(),
            max: values.max(),
        }
    }
}
