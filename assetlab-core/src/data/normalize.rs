//! Normalization: raw column names to the canonical schema.
//!
//! Three steps, always in this order:
//! 1. rename configured raw columns to canonical names
//! 2. drop columns that are not part of the retained model
//! 3. derive the numeric month index from the month label
//!
//! The row count never changes. Consumes the `RawTable` so the raw and
//! normalized views can never alias.

use crate::data::schema::SchemaError;
use crate::domain::{ColumnKind, Dataset, Month, MonthLocale, RawTable};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do when a column listed for dropping is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Absent column is a `SchemaError`.
    #[default]
    Strict,
    /// Absent column is skipped with a warning.
    Lenient,
}

/// Normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Raw column name → canonical name.
    pub rename: BTreeMap<String, String>,
    /// Columns removed after renaming (raw names that were not renamed).
    pub drop: Vec<String>,
    pub drop_policy: DropPolicy,
    /// Canonical name of the categorical month column.
    pub month_column: String,
    /// Name of the derived month index column.
    pub month_index_column: String,
    pub month_locale: MonthLocale,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        let rename = [
            ("Asset", "asset"),
            ("Month", "month"),
            ("Momentum", "return"),
            ("Volumen", "volume"),
            ("Volatility%", "volatility_range"),
        ]
        .into_iter()
        .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
        .collect();

        Self {
            rename,
            drop: vec!["Date".into()],
            drop_policy: DropPolicy::Strict,
            month_column: "month".into(),
            month_index_column: "month_index".into(),
            month_locale: MonthLocale::Spanish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("unrecognized value '{value}' in column {column} at row {row}")]
    UnrecognizedCategory {
        column: String,
        /// 1-based data row (header excluded).
        row: usize,
        value: String,
    },
}

impl From<PolarsError> for NormalizeError {
    fn from(err: PolarsError) -> Self {
        NormalizeError::Schema(err.into())
    }
}

/// Applies a `NormalizeConfig` to raw tables.
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Run rename, drop and derive on an owned table.
    pub fn normalize(&self, table: RawTable) -> Result<Dataset, NormalizeError> {
        let rows = table.height();
        let mut frame = table.into_frame();

        self.rename(&mut frame)?;
        self.drop_columns(&mut frame)?;
        let index = self.month_index(&frame)?;
        frame.with_column(index)?;

        debug_assert_eq!(frame.height(), rows);
        tracing::debug!(rows, columns = frame.width(), "normalized dataset");
        Ok(Dataset::from_frame(frame))
    }

    /// Simultaneous rename: every source must exist, and no two surviving
    /// columns may end up with the same name.
    fn rename(&self, frame: &mut DataFrame) -> Result<(), NormalizeError> {
        for raw in self.config.rename.keys() {
            if frame.get_column_index(raw).is_none() {
                return Err(SchemaError::MissingColumn(raw.clone()).into());
            }
        }

        let renamed: Vec<String> = frame
            .get_columns()
            .iter()
            .map(|c| {
                let name = c.name().as_str();
                self.config
                    .rename
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| name.to_string())
            })
            .collect();

        for (i, name) in renamed.iter().enumerate() {
            if renamed[..i].contains(name) {
                return Err(SchemaError::DuplicateColumn(name.clone()).into());
            }
        }

        let columns: Vec<Column> = frame
            .get_columns()
            .iter()
            .zip(renamed)
            .map(|(c, name)| {
                let mut c = c.clone();
                c.rename(name.into());
                c
            })
            .collect();
        *frame = DataFrame::new(columns)?;
        Ok(())
    }

    fn drop_columns(&self, frame: &mut DataFrame) -> Result<(), NormalizeError> {
        for name in &self.config.drop {
            if frame.get_column_index(name).is_some() {
                frame.drop_in_place(name)?;
                continue;
            }
            match self.config.drop_policy {
                DropPolicy::Strict => {
                    return Err(SchemaError::MissingColumn(name.clone()).into());
                }
                DropPolicy::Lenient => {
                    tracing::warn!(column = %name, "column to drop is absent, skipping");
                }
            }
        }
        Ok(())
    }

    fn month_index(&self, frame: &DataFrame) -> Result<Column, NormalizeError> {
        let source = &self.config.month_column;
        let target = &self.config.month_index_column;

        if frame.get_column_index(target).is_some() {
            return Err(SchemaError::DuplicateColumn(target.clone()).into());
        }

        let column = frame
            .column(source)
            .map_err(|_| SchemaError::MissingColumn(source.clone()))?;
        let labels = column.str().map_err(|_| SchemaError::TypeMismatch {
            column: source.clone(),
            expected: ColumnKind::Text,
            actual: ColumnKind::of(column.dtype()),
        })?;

        let indices = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                label
                    .and_then(|l| Month::parse(l, self.config.month_locale))
                    .map(|m| Some(f64::from(m.index())))
                    .ok_or_else(|| NormalizeError::UnrecognizedCategory {
                        column: source.clone(),
                        row: i + 1,
                        value: label.unwrap_or("<null>").to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Column::new(target.as_str().into(), indices))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizeConfig::default())
    }
}
