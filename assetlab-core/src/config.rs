//! Pipeline configuration, loadable from TOML.
//!
//! Every section is optional; the defaults reproduce the reference dataset
//! layout, so running without a config file is the common case.
//!
//! ```toml
//! balance_policy = "truncate_to_shortest"
//!
//! [ingest]
//! delimiter = ";"
//!
//! [normalize]
//! drop_policy = "lenient"
//!
//! [[download.assets]]
//! name = "SP500"
//! symbol = "^GSPC"
//! ```

use crate::data::download::AssetSpec;
use crate::data::ingest::IngestOptions;
use crate::data::normalize::NormalizeConfig;
use crate::data::provider::Interval;
use crate::data::schema::CanonicalSchema;
use crate::data::validate::BalancePolicy;
use crate::data::yahoo::HttpSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingest: IngestOptions,
    pub normalize: NormalizeConfig,
    pub schema: CanonicalSchema,
    pub balance_policy: BalancePolicy,
    pub download: DownloadConfig,
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if !self.ingest.delimiter.is_ascii() {
            return Err(ConfigError::Invalid(format!(
                "delimiter '{}' is not ASCII",
                self.ingest.delimiter
            )));
        }
        if !matches!(self.ingest.decimal, '.' | ',') {
            return Err(ConfigError::Invalid(format!(
                "decimal separator must be '.' or ',', got '{}'",
                self.ingest.decimal
            )));
        }
        if self.ingest.decimal == ',' && self.ingest.delimiter == ',' {
            return Err(ConfigError::Invalid(
                "decimal comma needs a delimiter other than ','".into(),
            ));
        }
        if self.download.years == 0 {
            return Err(ConfigError::Invalid("download.years must be at least 1".into()));
        }
        Ok(())
    }
}

/// Market-data download settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub assets: Vec<AssetSpec>,
    pub years: u32,
    pub interval: Interval,
    pub out_dir: PathBuf,
    /// Appended to the asset name to form the bar file name.
    pub file_suffix: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            assets: vec![
                AssetSpec::new("SP500", "^GSPC"),
                AssetSpec::new("Gold", "GC=F"),
                AssetSpec::new("BTC", "BTC-USD"),
            ],
            years: 5,
            interval: Interval::Monthly,
            out_dir: PathBuf::from("."),
            file_suffix: "_60meses".into(),
            timeout_secs: 30,
            max_retries: 3,
            base_delay_ms: 500,
        }
    }
}

impl DownloadConfig {
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}
