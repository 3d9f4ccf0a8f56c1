//! Calendar-month return profile across all assets.

use crate::data::schema::SchemaError;
use crate::domain::{Dataset, Month};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Return behaviour of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthProfile {
    pub month: Month,
    /// Rows with a present return in this month.
    pub count: usize,
    pub mean_return: Option<f64>,
    /// Fraction of those rows with a strictly positive return.
    pub positive_share: Option<f64>,
}

/// Profile for every month that has at least one row, January first.
pub fn month_profile(
    dataset: &Dataset,
    month_index: &str,
    returns: &str,
) -> Result<Vec<MonthProfile>, SchemaError> {
    dataset.numeric(month_index)?;
    dataset.numeric(returns)?;
    if dataset.height() == 0 {
        return Ok(Vec::new());
    }

    let ret = || col(returns).cast(DataType::Float64);
    let months = dataset
        .frame()
        .clone()
        .lazy()
        .filter(col(month_index).is_not_null())
        .group_by([col(month_index).cast(DataType::Float64).alias("m")])
        .agg([
            ret().count().cast(DataType::UInt64).alias("count"),
            ret().mean().alias("mean"),
            ret().gt(lit(0.0)).cast(DataType::Float64).sum().alias("positive"),
        ])
        .sort(["m"], SortMultipleOptions::default())
        .collect()?;

    let index = months.column("m")?.f64()?;
    let count = months.column("count")?.u64()?;
    let mean = months.column("mean")?.f64()?;
    let positive = months.column("positive")?.f64()?;

    let profile = index
        .into_iter()
        .zip(count)
        .zip(mean)
        .zip(positive)
        .filter_map(|(((m, count), mean), positive)| {
            let month = Month::from_index(m? as u8)?;
            let count = count.unwrap_or(0) as usize;
            Some(MonthProfile {
                month,
                count,
                mean_return: if count > 0 { mean } else { None },
                positive_share: (count > 0).then(|| positive.unwrap_or(0.0) / count as f64),
            })
        })
        .collect();

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawTable;

    #[test]
    fn groups_returns_by_month_in_calendar_order() {
        let ds = Dataset::from_table(
            RawTable::new(vec![
                Column::new(
                    "month_index".into(),
                    &[Some(10.0), Some(3.0), Some(3.0), Some(10.0), Some(8.0)],
                ),
                Column::new(
                    "return".into(),
                    &[Some(2.0), Some(1.0), Some(3.0), Some(-1.0), None],
                ),
            ])
            .unwrap(),
        );
        let profile = month_profile(&ds, "month_index", "return").unwrap();

        let order: Vec<Month> = profile.iter().map(|p| p.month).collect();
        assert_eq!(order, vec![Month::Mar, Month::Aug, Month::Oct]);

        assert_eq!(profile[0].mean_return, Some(2.0));
        assert_eq!(profile[0].positive_share, Some(1.0));
        assert_eq!(profile[1].count, 0);
        assert_eq!(profile[1].mean_return, None);
        assert_eq!(profile[1].positive_share, None);
        assert_eq!(profile[2].positive_share, Some(0.5));
    }
}
