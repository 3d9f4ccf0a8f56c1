//! Domain types for assetlab

pub mod month;
pub mod observation;
pub mod table;

pub use month::{Month, MonthLocale};
pub use observation::Observation;
pub use table::{ColumnKind, Dataset, RawTable};

/// Asset identifier type alias
pub type AssetName = String;
