//! Descriptive summarization: counts, missing values, distributions,
//! per-asset comparison, seasonality and correlation.

pub mod correlation;
pub mod describe;
pub mod group;
pub mod seasonality;
pub mod stats;
pub mod summary;

pub use correlation::CorrelationMatrix;
pub use describe::{ColumnInfo, DescribeStats};
pub use seasonality::MonthProfile;
pub use stats::SeriesStats;
pub use summary::{AssetStats, Summarizer, Summary};

use crate::data::schema::SchemaError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SummaryError {
    #[error("insufficient data: {reason}")]
    InsufficientData { reason: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<polars::prelude::PolarsError> for SummaryError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        SummaryError::Schema(err.into())
    }
}
