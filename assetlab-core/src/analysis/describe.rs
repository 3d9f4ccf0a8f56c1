//! Per-column descriptive statistics.

use super::stats::{present, quantile, sample_std};
use crate::domain::{ColumnKind, Dataset};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Count, non-null type and missing count of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub kind: ColumnKind,
}

/// The classic eight-number description of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl DescribeStats {
    pub fn of(column: impl Into<String>, values: &Float64Chunked) -> PolarsResult<Self> {
        Ok(Self {
            column: column.into(),
            count: present(values),
            mean: values.mean(),
            std: sample_std(values),
            min: values.min(),
            p25: quantile(values, 0.25)?,
            median: quantile(values, 0.5)?,
            p75: quantile(values, 0.75)?,
            max: values.max(),
        })
    }
}

pub fn column_info(dataset: &Dataset) -> Vec<ColumnInfo> {
    dataset
        .frame()
        .get_columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name().to_string(),
            non_null: c.len() - c.null_count(),
            kind: ColumnKind::of(c.dtype()),
        })
        .collect()
}

/// Missing-cell count for every column, zero included, in column order.
pub fn missing_counts(dataset: &Dataset) -> Vec<(String, usize)> {
    dataset
        .frame()
        .get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}

/// Describe every numeric column, in column order.
pub fn describe(dataset: &Dataset) -> PolarsResult<Vec<DescribeStats>> {
    dataset
        .frame()
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::Float64)
        .map(|c| DescribeStats::of(c.name().as_str(), c.f64()?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawTable;

    fn dataset() -> Dataset {
        Dataset::from_table(
            RawTable::new(vec![
                Column::new("asset".into(), &[Some("A"), None, Some("B")]),
                Column::new("x".into(), &[Some(3.0), Some(1.0), None]),
                Column::new("y".into(), &[1.0, 2.0, 3.0]),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn missing_counts_cover_every_column() {
        assert_eq!(
            missing_counts(&dataset()),
            vec![("asset".into(), 1), ("x".into(), 1), ("y".into(), 0)]
        );
    }

    #[test]
    fn column_info_counts_non_null() {
        let info = column_info(&dataset());
        assert_eq!(info[0].non_null, 2);
        assert_eq!(info[0].kind, ColumnKind::Text);
        assert_eq!(info[2].non_null, 3);
        assert_eq!(info[2].kind, ColumnKind::Numeric);
    }

    #[test]
    fn describe_skips_text_and_missing() {
        let d = describe(&dataset()).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].column, "x");
        assert_eq!(d[0].count, 2);
        assert_eq!(d[0].mean, Some(2.0));
        assert_eq!(d[1].median, Some(2.0));
        assert!((d[1].std.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(d[1].p25, Some(1.5));
    }
}
