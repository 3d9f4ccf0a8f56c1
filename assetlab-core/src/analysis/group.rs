//! Row counts by a categorical column.

use crate::data::schema::SchemaError;
use crate::domain::Dataset;
use polars::prelude::*;

const COUNT: &str = "__rows";

/// Row count per label, in order of first appearance.
///
/// Rows with a missing label belong to no group.
pub fn value_counts(dataset: &Dataset, column: &str) -> Result<Vec<(String, usize)>, SchemaError> {
    let labels = dataset.text(column)?;
    if labels.null_count() == labels.len() {
        return Ok(Vec::new());
    }

    let counts = dataset
        .frame()
        .clone()
        .lazy()
        .filter(col(column).is_not_null())
        .group_by_stable([col(column)])
        .agg([len().cast(DataType::UInt64).alias(COUNT)])
        .collect()?;

    let labels = counts.column(column)?.str()?;
    let sizes = counts.column(COUNT)?.u64()?;

    Ok(labels
        .into_iter()
        .zip(sizes)
        .filter_map(|(label, n)| Some((label?.to_string(), n? as usize)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawTable;

    fn dataset() -> Dataset {
        Dataset::from_table(
            RawTable::new(vec![
                Column::new("asset".into(), &[Some("BTC"), Some("Gold"), None, Some("BTC")]),
                Column::new("x".into(), &[1.0, 2.0, 3.0, 4.0]),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn value_counts_in_first_appearance_order_skipping_missing() {
        let counts = value_counts(&dataset(), "asset").unwrap();
        assert_eq!(counts, vec![("BTC".to_string(), 2), ("Gold".to_string(), 1)]);
    }

    #[test]
    fn numeric_column_is_rejected() {
        assert!(matches!(
            value_counts(&dataset(), "x"),
            Err(SchemaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn missing_column_is_reported() {
        assert_eq!(
            value_counts(&dataset(), "ticker"),
            Err(SchemaError::MissingColumn("ticker".into()))
        );
    }
}
