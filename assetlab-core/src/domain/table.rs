//! Columnar tables: the ingested `RawTable` and the normalized `Dataset`.
//!
//! Both wrap a polars `DataFrame` whose columns are either `Float64` or
//! `String`. Row order is file order.

use crate::data::schema::SchemaError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    /// Kind of a column with the given polars type.
    pub fn of(dtype: &DataType) -> ColumnKind {
        match dtype {
            DataType::Float64 => ColumnKind::Numeric,
            _ => ColumnKind::Text,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => f.pad("float64"),
            ColumnKind::Text => f.pad("text"),
        }
    }
}

/// Ordered set of equal-length, uniquely named columns.
#[derive(Debug, Clone)]
pub struct RawTable {
    frame: DataFrame,
}

impl RawTable {
    /// Build a table, rejecting duplicate names and ragged columns.
    ///
    /// Integer and `Float32` columns are widened to `Float64` and an
    /// untyped null column becomes text; any other type is rejected.
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        let height = columns.first().map(|c| c.len()).unwrap_or(0);
        let mut conformed = Vec::with_capacity(columns.len());

        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name() == column.name()) {
                return Err(SchemaError::DuplicateColumn(column.name().to_string()));
            }
            if column.len() != height {
                return Err(SchemaError::RaggedColumn {
                    column: column.name().to_string(),
                    expected: height,
                    actual: column.len(),
                });
            }
            conformed.push(conform(column)?);
        }

        Ok(Self {
            frame: DataFrame::new(conformed)?,
        })
    }

    /// Wrap a frame whose columns are already `Float64` or `String`.
    pub(crate) fn from_frame(frame: DataFrame) -> Self {
        debug_assert!(frame
            .get_columns()
            .iter()
            .all(|c| matches!(c.dtype(), DataType::Float64 | DataType::String)));
        Self { frame }
    }

    pub(crate) fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.frame
            .get_columns()
            .iter()
            .map(|c| c.name().as_str())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.frame.column(name).ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.column(name).map(|c| ColumnKind::of(c.dtype()))
    }

    /// Values of a numeric column. A column with no present cell reads as
    /// an all-null numeric column whatever its inferred type.
    pub fn numeric(&self, name: &str) -> Result<Float64Chunked, SchemaError> {
        let column = self
            .column(name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))?;
        match column.dtype() {
            DataType::Float64 => Ok(column.f64()?.clone()),
            _ if is_all_null(column) => Ok(Float64Chunked::full_null(
                column.name().clone(),
                column.len(),
            )),
            dtype => Err(SchemaError::TypeMismatch {
                column: name.to_string(),
                expected: ColumnKind::Numeric,
                actual: ColumnKind::of(dtype),
            }),
        }
    }

    /// Values of a text column, with the same all-null leniency as `numeric`.
    pub fn text(&self, name: &str) -> Result<StringChunked, SchemaError> {
        let column = self
            .column(name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))?;
        match column.dtype() {
            DataType::String => Ok(column.str()?.clone()),
            _ if is_all_null(column) => Ok(StringChunked::full_null(
                column.name().clone(),
                column.len(),
            )),
            dtype => Err(SchemaError::TypeMismatch {
                column: name.to_string(),
                expected: ColumnKind::Text,
                actual: ColumnKind::of(dtype),
            }),
        }
    }
}

impl PartialEq for RawTable {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

/// True when the column has no present cell, including when it has no rows.
pub(crate) fn is_all_null(column: &Column) -> bool {
    column.null_count() == column.len()
}

fn conform(column: &Column) -> Result<Column, SchemaError> {
    match column.dtype() {
        DataType::Float64 | DataType::String => Ok(column.clone()),
        DataType::Float32
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt32
        | DataType::UInt64 => Ok(column.cast(&DataType::Float64)?),
        DataType::Null => Ok(column.cast(&DataType::String)?),
        other => Err(SchemaError::UnsupportedType {
            column: column.name().to_string(),
            dtype: other.to_string(),
        }),
    }
}

/// A table that has passed normalization. Read-only from here on.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    table: RawTable,
}

impl Dataset {
    pub(crate) fn from_table(table: RawTable) -> Self {
        Self { table }
    }

    pub(crate) fn from_frame(frame: DataFrame) -> Self {
        Self::from_table(RawTable::from_frame(frame))
    }

    pub fn table(&self) -> &RawTable {
        &self.table
    }

    pub fn frame(&self) -> &DataFrame {
        self.table.frame()
    }

    pub fn height(&self) -> usize {
        self.table.height()
    }

    pub fn width(&self) -> usize {
        self.table.width()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.table.shape()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.table.column(name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.table.column_names()
    }

    pub fn numeric(&self, name: &str) -> Result<Float64Chunked, SchemaError> {
        self.table.numeric(name)
    }

    pub fn text(&self, name: &str) -> Result<StringChunked, SchemaError> {
        self.table.text(name)
    }

    /// A new dataset holding only `rows`, in the given order.
    pub(crate) fn take_rows(&self, rows: &[usize]) -> Result<Dataset, SchemaError> {
        let idx = IdxCa::from_vec(
            "row".into(),
            rows.iter().map(|&i| i as IdxSize).collect(),
        );
        Ok(Dataset::from_frame(self.frame().take(&idx)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_table() -> RawTable {
        RawTable::new(vec![
            Column::new("asset".into(), &[Some("BTC"), Some("Gold"), None]),
            Column::new("return".into(), &[Some(1.5), None, Some(-0.5)]),
        ])
        .unwrap()
    }

    #[test]
    fn shape_and_lookup() {
        let t = two_column_table();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.column_names(), vec!["asset", "return"]);
        assert_eq!(t.kind("return"), Some(ColumnKind::Numeric));
        assert_eq!(t.kind("asset"), Some(ColumnKind::Text));
        assert!(t.column("missing").is_none());
    }

    #[test]
    fn null_counts_per_column() {
        let t = two_column_table();
        assert_eq!(t.column("asset").unwrap().null_count(), 1);
        assert_eq!(t.column("return").unwrap().null_count(), 1);
    }

    #[test]
    fn integer_columns_are_widened() {
        let t = RawTable::new(vec![Column::new("volume".into(), &[1i64, 2, 3])]).unwrap();
        assert_eq!(t.kind("volume"), Some(ColumnKind::Numeric));
        let v: Vec<Option<f64>> = t.numeric("volume").unwrap().into_iter().collect();
        assert_eq!(v, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn all_null_column_reads_as_either_kind() {
        let t = RawTable::new(vec![Column::new("x".into(), &[None::<&str>, None])]).unwrap();
        assert_eq!(t.numeric("x").unwrap().null_count(), 2);
        assert_eq!(t.text("x").unwrap().null_count(), 2);
    }

    #[test]
    fn text_column_is_not_numeric() {
        let err = two_column_table().numeric("asset").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::TypeMismatch { expected: ColumnKind::Numeric, actual: ColumnKind::Text, .. }
        ));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = RawTable::new(vec![
            Column::new("x".into(), &[1.0]),
            Column::new("x".into(), &[2.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn(name) if name == "x"));
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = RawTable::new(vec![
            Column::new("x".into(), &[1.0, 2.0]),
            Column::new("y".into(), &[2.0]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::RaggedColumn { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn take_rows_keeps_requested_order() {
        let ds = Dataset::from_table(two_column_table()).take_rows(&[2, 0]).unwrap();
        assert_eq!(ds.height(), 2);
        let r: Vec<Option<f64>> = ds.numeric("return").unwrap().into_iter().collect();
        assert_eq!(r, vec![Some(-0.5), Some(1.5)]);
    }
}
