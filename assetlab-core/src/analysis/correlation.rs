//! Pairwise Pearson correlation over the canonical numeric columns.

use super::SummaryError;
use crate::data::schema::CanonicalSchema;
use crate::domain::Dataset;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Symmetric correlation matrix; rows and columns share one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlation of two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Pearson correlation of columns `a` and `b` on their pairwise-complete rows.
///
/// Fails when fewer than two complete rows remain, or when the coefficient
/// is not a finite number (zero variance on either side).
pub fn pearson(frame: &DataFrame, a: &str, b: &str) -> Result<f64, SummaryError> {
    let insufficient = |reason: String| SummaryError::InsufficientData {
        reason: if a == b {
            format!("column {a}: {reason}")
        } else {
            format!("columns {a} and {b}: {reason}")
        },
    };

    let pairs = frame
        .clone()
        .lazy()
        .select([
            col(a).cast(DataType::Float64).alias("x"),
            col(b).cast(DataType::Float64).alias("y"),
        ])
        .filter(col("x").is_not_null().and(col("y").is_not_null()))
        .collect()?;

    if pairs.height() < 2 {
        return Err(insufficient(format!(
            "{} complete row(s), need at least 2",
            pairs.height()
        )));
    }

    let r = pairs
        .lazy()
        .select([pearson_corr(col("x"), col("y")).alias("r")])
        .collect()?
        .column("r")?
        .f64()?
        .get(0);

    match r {
        Some(r) if r.is_finite() => Ok(r.clamp(-1.0, 1.0)),
        _ => Err(insufficient("zero variance or non-finite values".into())),
    }
}

/// Correlation matrix over return, volume, volatility range and month index.
pub fn correlation_matrix(
    dataset: &Dataset,
    schema: &CanonicalSchema,
) -> Result<CorrelationMatrix, SummaryError> {
    let columns = schema.correlated();
    for name in columns {
        dataset.numeric(name)?;
    }

    let frame = dataset.frame();
    let k = columns.len();
    let mut values = vec![vec![0.0; k]; k];

    for i in 0..k {
        // The diagonal is only defined where the column itself has spread.
        pearson(frame, columns[i], columns[i])?;
        values[i][i] = 1.0;

        for j in (i + 1)..k {
            let r = pearson(frame, columns[i], columns[j])?;
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawTable;

    fn dataset(columns: Vec<Column>) -> Dataset {
        Dataset::from_table(RawTable::new(columns).unwrap())
    }

    fn canonical(ret: &[f64], volume: &[f64], range: &[f64], month: &[f64]) -> Dataset {
        let n = ret.len();
        dataset(vec![
            Column::new("asset".into(), vec!["A"; n]),
            Column::new("month".into(), vec!["ene"; n]),
            Column::new("return".into(), ret),
            Column::new("volume".into(), volume),
            Column::new("volatility_range".into(), range),
            Column::new("month_index".into(), month),
        ])
    }

    #[test]
    fn perfectly_correlated_and_anticorrelated() {
        let df = df!(
            "x" => &[1.0, 2.0, 3.0, 4.0],
            "y" => &[2.0, 4.0, 6.0, 8.0],
            "z" => &[4.0, 3.0, 2.0, 1.0],
        )
        .unwrap();
        assert!((pearson(&df, "x", "y").unwrap() - 1.0).abs() < 1e-9);
        assert!((pearson(&df, "x", "z").unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn known_coefficient() {
        let df = df!(
            "x" => &[1.0, 2.0, 3.0, 4.0, 5.0],
            "y" => &[2.0, 1.0, 4.0, 3.0, 5.0],
        )
        .unwrap();
        assert!((pearson(&df, "x", "y").unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn uses_pairwise_complete_rows() {
        let df = df!(
            "x" => &[Some(1.0), None, Some(3.0), Some(5.0)],
            "y" => &[Some(1.0), Some(100.0), Some(3.0), Some(5.0)],
        )
        .unwrap();
        assert!((pearson(&df, "x", "y").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_too_few_rows_and_constant_columns() {
        let one = df!("x" => &[1.0], "y" => &[2.0]).unwrap();
        assert!(pearson(&one, "x", "y").is_err());

        let flat = df!("x" => &[1.0, 1.0, 1.0], "y" => &[1.0, 2.0, 3.0]).unwrap();
        let err = pearson(&flat, "x", "y").unwrap_err();
        assert!(matches!(err, SummaryError::InsufficientData { .. }));
    }

    #[test]
    fn infinite_values_never_yield_nan() {
        let df = df!(
            "x" => &[1.0, f64::INFINITY, 3.0],
            "y" => &[1.0, 2.0, 3.0],
        )
        .unwrap();
        assert!(matches!(
            pearson(&df, "x", "y"),
            Err(SummaryError::InsufficientData { .. })
        ));
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let ds = canonical(
            &[1.0, 2.0, 3.0, 5.0],
            &[0.5, 0.1, 0.9, 0.3],
            &[10.0, 7.0, 8.0, 1.0],
            &[1.0, 2.0, 3.0, 4.0],
        );
        let m = correlation_matrix(&ds, &CanonicalSchema::default()).unwrap();
        assert_eq!(
            m.columns,
            vec!["return", "volume", "volatility_range", "month_index"]
        );
        for i in 0..m.len() {
            assert_eq!(m.values[i][i], 1.0);
            for j in 0..m.len() {
                assert_eq!(m.values[i][j], m.values[j][i]);
                assert!((-1.0..=1.0).contains(&m.values[i][j]));
            }
        }
        assert_eq!(m.get("return", "volatility_range"), Some(m.values[0][2]));
    }

    #[test]
    fn extra_numeric_columns_stay_out_of_the_matrix() {
        let ds = canonical(
            &[1.0, 2.0, 3.0, 5.0],
            &[0.5, 0.1, 0.9, 0.3],
            &[10.0, 7.0, 8.0, 1.0],
            &[1.0, 2.0, 3.0, 4.0],
        );
        let mut frame = ds.frame().clone();
        frame
            .with_column(Column::new("Close".into(), &[None::<f64>, None, None, None]))
            .unwrap();
        let ds = Dataset::from_frame(frame);

        let m = correlation_matrix(&ds, &CanonicalSchema::default()).unwrap();
        assert_eq!(m.len(), 4);
        assert!(m.get("Close", "return").is_none());
    }

    #[test]
    fn empty_dataset_is_insufficient() {
        let ds = canonical(&[], &[], &[], &[]);
        assert!(matches!(
            correlation_matrix(&ds, &CanonicalSchema::default()),
            Err(SummaryError::InsufficientData { .. })
        ));
    }
}
