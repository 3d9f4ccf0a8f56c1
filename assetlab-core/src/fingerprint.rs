//! Dataset fingerprinting: a BLAKE3 hash over column names, kinds and cells.
//!
//! Two datasets with the same fingerprint produce the same summary, so a
//! report can always be matched to the exact input it was computed from.

use crate::domain::Dataset;
use polars::prelude::*;

/// Hex-encoded BLAKE3 hash of the dataset contents.
pub fn dataset_fingerprint(dataset: &Dataset) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(dataset.height() as u64).to_le_bytes());

    for column in dataset.frame().get_columns() {
        update_str(&mut hasher, column.name());
        if let Ok(values) = column.f64() {
            hasher.update(b"N");
            for v in values {
                match v {
                    Some(x) => {
                        hasher.update(&[1]);
                        hasher.update(&x.to_bits().to_le_bytes());
                    }
                    None => {
                        hasher.update(&[0]);
                    }
                }
            }
        } else if let Ok(values) = column.str() {
            hasher.update(b"T");
            for v in values {
                match v {
                    Some(s) => {
                        hasher.update(&[1]);
                        update_str(&mut hasher, s);
                    }
                    None => {
                        hasher.update(&[0]);
                    }
                }
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}

fn update_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}
