//! Deterministic synthetic monthly bars for demos and tests.
//!
//! Each asset gets its own RNG whose seed is derived from the master seed
//! and the asset name via BLAKE3, so adding or reordering assets never
//! changes another asset's series.

use crate::data::assemble::{assemble, AssembledRow};
use crate::data::provider::PriceBar;
use chrono::{Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shape of one synthetic price series, in percent per month.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetProfile {
    pub name: String,
    pub start_price: f64,
    pub drift_pct: f64,
    pub vol_pct: f64,
    pub mean_volume: f64,
}

impl AssetProfile {
    fn new(name: &str, start_price: f64, drift_pct: f64, vol_pct: f64, mean_volume: f64) -> Self {
        Self {
            name: name.to_string(),
            start_price,
            drift_pct,
            vol_pct,
            mean_volume,
        }
    }
}

/// Equity index, gold and bitcoin, roughly scaled like the real series.
pub fn default_profiles() -> Vec<AssetProfile> {
    vec![
        AssetProfile::new("SP500", 3_700.0, 0.9, 4.5, 8.0e10),
        AssetProfile::new("Gold", 1_850.0, 0.6, 3.5, 4.0e6),
        AssetProfile::new("BTC", 29_000.0, 2.5, 18.0, 9.0e11),
    ]
}

#[derive(Debug, Clone)]
pub struct SampleGenerator {
    seed: u64,
    profiles: Vec<AssetProfile>,
    start: NaiveDate,
}

impl SampleGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            profiles: default_profiles(),
            start: NaiveDate::from_ymd_opt(2020, 12, 1).unwrap_or_default(),
        }
    }

    pub fn with_profiles(mut self, profiles: Vec<AssetProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    /// First bar date. Bars fall on the first of each following month.
    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = start;
        self
    }

    pub fn profiles(&self) -> &[AssetProfile] {
        &self.profiles
    }

    fn asset_seed(&self, asset: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(asset.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// `count` monthly bars for one profile.
    pub fn bars(&self, profile: &AssetProfile, count: usize) -> Vec<PriceBar> {
        let mut rng = StdRng::seed_from_u64(self.asset_seed(&profile.name));
        let mut close = profile.start_price;
        let mut bars = Vec::with_capacity(count);

        for i in 0..count {
            let Some(date) = self.start.checked_add_months(Months::new(i as u32)) else {
                break;
            };
            let open = close;
            let ret = (profile.drift_pct + profile.vol_pct * normal(&mut rng)) / 100.0;
            close = (open * (1.0 + ret)).max(open * 0.05);

            let spread = profile.vol_pct / 100.0 * 0.5;
            let high = open.max(close) * (1.0 + spread * rng.gen::<f64>());
            let low = open.min(close) * (1.0 - spread * rng.gen::<f64>()).max(0.01);
            let volume = (profile.mean_volume * (0.5 + rng.gen::<f64>())).round() as u64;

            bars.push(PriceBar {
                date,
                open,
                high,
                low,
                close,
                adj_close: close,
                volume,
            });
        }
        bars
    }

    /// Bars for every profile, keyed by asset name, in profile order.
    pub fn all_bars(&self, count: usize) -> Vec<(String, Vec<PriceBar>)> {
        self.profiles
            .iter()
            .map(|p| (p.name.clone(), self.bars(p, count)))
            .collect()
    }

    /// A combined dataset with exactly `months` rows per asset.
    pub fn assembled(&self, months: usize) -> Vec<AssembledRow> {
        // One extra bar: the first month has no predecessor.
        let rows = assemble(&self.all_bars(months + 1));
        tracing::debug!(seed = self.seed, months, rows = rows.len(), "generated sample dataset");
        rows
    }
}

/// Standard normal draw (Box-Muller).
fn normal(rng: &mut StdRng) -> f64 {
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
