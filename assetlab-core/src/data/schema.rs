use crate::domain::table::is_all_null;
use crate::domain::{ColumnKind, RawTable};
use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};

/// Canonical column names of a normalized dataset.
///
/// Defaults match the names the normalizer produces from the reference
/// mapping; override them together with the rename map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalSchema {
    pub asset: String,
    pub month: String,
    #[serde(rename = "return")]
    pub ret: String,
    pub volume: String,
    pub volatility_range: String,
    pub month_index: String,
}

impl Default for CanonicalSchema {
    fn default() -> Self {
        Self {
            asset: "asset".into(),
            month: "month".into(),
            ret: "return".into(),
            volume: "volume".into(),
            volatility_range: "volatility_range".into(),
            month_index: "month_index".into(),
        }
    }
}

impl CanonicalSchema {
    /// Every canonical column with the kind it must have, in canonical order.
    pub fn fields(&self) -> [(&str, ColumnKind); 6] {
        [
            (self.asset.as_str(), ColumnKind::Text),
            (self.month.as_str(), ColumnKind::Text),
            (self.ret.as_str(), ColumnKind::Numeric),
            (self.volume.as_str(), ColumnKind::Numeric),
            (self.volatility_range.as_str(), ColumnKind::Numeric),
            (self.month_index.as_str(), ColumnKind::Numeric),
        ]
    }

    /// The numeric columns that enter the correlation matrix, in matrix order.
    pub fn correlated(&self) -> [&str; 4] {
        [
            self.ret.as_str(),
            self.volume.as_str(),
            self.volatility_range.as_str(),
            self.month_index.as_str(),
        ]
    }

    /// Validate a table against the canonical schema.
    ///
    /// A column without any present cell carries no type and passes the
    /// kind check.
    pub fn validate(&self, table: &RawTable) -> Result<(), SchemaError> {
        for (name, _) in self.fields() {
            if !table.contains(name) {
                return Err(SchemaError::MissingColumn(name.to_string()));
            }
        }

        for (name, expected) in self.fields() {
            let column = table
                .column(name)
                .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))?;
            if is_all_null(column) {
                continue;
            }
            let actual = ColumnKind::of(column.dtype());
            if actual != expected {
                return Err(SchemaError::TypeMismatch {
                    column: name.to_string(),
                    expected,
                    actual,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("column {column} has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("type mismatch in column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },

    #[error("column {column} has unsupported type {dtype}")]
    UnsupportedType { column: String, dtype: String },

    #[error("dataframe operation failed: {0}")]
    Frame(String),
}

impl From<PolarsError> for SchemaError {
    fn from(err: PolarsError) -> Self {
        SchemaError::Frame(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn text(name: &str, v: &str) -> Column {
        Column::new(name.into(), &[v])
    }

    fn number(name: &str, v: f64) -> Column {
        Column::new(name.into(), &[v])
    }

    fn canonical_table() -> RawTable {
        RawTable::new(vec![
            text("asset", "SP500"),
            text("month", "ene"),
            number("return", 1.2),
            number("volume", 1000.0),
            number("volatility_range", 4.1),
            number("month_index", 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_validate_accepts_canonical_table() {
        assert!(CanonicalSchema::default().validate(&canonical_table()).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_column() {
        let table = RawTable::new(vec![text("asset", "SP500"), text("month", "ene")]).unwrap();

        let result = CanonicalSchema::default().validate(&table);
        assert_eq!(result, Err(SchemaError::MissingColumn("return".into())));
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let table = RawTable::new(vec![
            text("asset", "SP500"),
            text("month", "ene"),
            text("return", "not_a_number"),
            number("volume", 1000.0),
            number("volatility_range", 4.1),
            number("month_index", 1.0),
        ])
        .unwrap();

        let result = CanonicalSchema::default().validate(&table);
        assert!(matches!(result, Err(SchemaError::TypeMismatch { column, .. }) if column == "return"));
    }

    #[test]
    fn test_validate_accepts_untyped_empty_columns() {
        let empty_text = |name: &str| Column::new(name.into(), Vec::<Option<String>>::new());
        let table = RawTable::new(
            ["asset", "month", "return", "volume", "volatility_range"]
                .into_iter()
                .map(empty_text)
                .chain([Column::new("month_index".into(), Vec::<Option<f64>>::new())])
                .collect(),
        )
        .unwrap();
        assert!(CanonicalSchema::default().validate(&table).is_ok());
    }

    #[test]
    fn test_schema_deserializes_return_key() {
        let schema: CanonicalSchema = toml::from_str("return = \"rend\"").unwrap();
        assert_eq!(schema.ret, "rend");
        assert_eq!(schema.asset, "asset");
    }
}
