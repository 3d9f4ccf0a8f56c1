//! Observation: one (asset, month) row of a normalized dataset.

use super::month::Month;
use super::table::Dataset;
use crate::data::schema::{CanonicalSchema, SchemaError};
use serde::{Deserialize, Serialize};

/// Typed view of a canonical row. Numeric fields stay optional: a missing
/// cell is reported by the summarizer, not papered over here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub asset: String,
    pub month: Month,
    /// Monthly return, in percent.
    pub ret: Option<f64>,
    pub volume: Option<f64>,
    /// High-low range of the month, in percent.
    pub volatility_range: Option<f64>,
}

impl Dataset {
    /// Typed rows in file order.
    ///
    /// Rows without an asset label are skipped; every row has a valid month
    /// index because normalization rejects anything else.
    pub fn observations(&self, schema: &CanonicalSchema) -> Result<Vec<Observation>, SchemaError> {
        schema.validate(self.table())?;

        let assets = self.text(&schema.asset)?;
        let indices = self.numeric(&schema.month_index)?;
        let rets = self.numeric(&schema.ret)?;
        let volumes = self.numeric(&schema.volume)?;
        let ranges = self.numeric(&schema.volatility_range)?;

        let rows = assets
            .into_iter()
            .zip(&indices)
            .zip(&rets)
            .zip(&volumes)
            .zip(&ranges)
            .filter_map(|((((asset, month), ret), volume), volatility_range)| {
                Some(Observation {
                    asset: asset?.to_string(),
                    month: month.and_then(|m| Month::from_index(m as u8))?,
                    ret,
                    volume,
                    volatility_range,
                })
            })
            .collect();

        Ok(rows)
    }
}
