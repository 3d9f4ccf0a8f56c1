//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Row count is preserved by normalization
//! 2. Month index is in 1..=12 and agrees with the month label
//! 3. Correlation matrix is symmetric, unit-diagonal and bounded
//! 4. Summarization is idempotent
//! 5. Missing counts never exceed the row count and match the null pattern

use assetlab_core::analysis::Summarizer;
use assetlab_core::data::ingest::DataIngestor;
use assetlab_core::data::normalize::Normalizer;
use assetlab_core::domain::{Dataset, Month, MonthLocale};
use proptest::prelude::*;

const ASSETS: [&str; 3] = ["SP500", "Gold", "BTC"];

// ── Strategies (proptest) ────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Row {
    asset: usize,
    month: usize,
    ret: f64,
    range: f64,
    volume: u64,
}

fn arb_row() -> impl Strategy<Value = Row> {
    (0..3usize, 0..12usize, -50.0..50.0_f64, 0.0..80.0_f64, 0..10_000_000u64).prop_map(
        |(asset, month, ret, range, volume)| Row {
            asset,
            month,
            ret: (ret * 100.0).round() / 100.0,
            range: (range * 100.0).round() / 100.0,
            volume,
        },
    )
}

fn to_csv(rows: &[Row]) -> String {
    let labels = MonthLocale::Spanish.labels();
    let mut out = String::from("Date;Asset;Month;Momentum;Volatility%;Volumen\n");
    for r in rows {
        out.push_str(&format!(
            "2024-01-01;{};{};{};{};{}\n",
            ASSETS[r.asset], labels[r.month], r.ret, r.range, r.volume
        ));
    }
    out
}

fn normalize(rows: &[Row]) -> Dataset {
    let raw = DataIngestor::default()
        .ingest_reader(to_csv(rows).as_bytes())
        .unwrap();
    Normalizer::default().normalize(raw).unwrap()
}

// ── 1. Row count ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn normalization_preserves_row_count(rows in prop::collection::vec(arb_row(), 1..80)) {
        let ds = normalize(&rows);
        prop_assert_eq!(ds.height(), rows.len());
        prop_assert_eq!(ds.width(), 6);
    }
}

// ── 2. Month index ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn month_index_matches_label(rows in prop::collection::vec(arb_row(), 1..80)) {
        let ds = normalize(&rows);
        let index = ds.numeric("month_index").unwrap();
        let labels = ds.text("month").unwrap();

        for ((idx, label), row) in index.into_iter().zip(&labels).zip(&rows) {
            let idx = idx.unwrap();
            prop_assert!((1.0..=12.0).contains(&idx));
            prop_assert_eq!(idx as usize, row.month + 1);

            let parsed = Month::parse(label.unwrap(), MonthLocale::Spanish).unwrap();
            prop_assert_eq!(parsed.index() as f64, idx);
        }
    }

    #[test]
    fn month_parse_is_referentially_transparent(m in 0..12usize, upper in any::<bool>()) {
        let label = MonthLocale::Spanish.labels()[m];
        let label = if upper { label.to_uppercase() } else { label.to_string() };
        let a = Month::parse(&label, MonthLocale::Spanish);
        let b = Month::parse(&label, MonthLocale::Spanish);
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.map(Month::index), Some(m as u8 + 1));
    }
}

// ── 3 & 4. Correlation and idempotence ───────────────────────────────

proptest! {
    #[test]
    fn correlation_is_symmetric_and_bounded(rows in prop::collection::vec(arb_row(), 3..80)) {
        let ds = normalize(&rows);
        // Degenerate draws (a constant column) are rejected; nothing to check then.
        let Ok(summary) = Summarizer::default().summarize(&ds) else {
            return Ok(());
        };
        let m = &summary.correlation;
        for i in 0..m.len() {
            prop_assert_eq!(m.values[i][i], 1.0);
            for j in 0..m.len() {
                let v = m.values[i][j];
                prop_assert!((-1.0..=1.0).contains(&v), "out of range: {}", v);
                prop_assert_eq!(v, m.values[j][i]);
            }
        }
    }

    #[test]
    fn summarize_is_idempotent(rows in prop::collection::vec(arb_row(), 3..60)) {
        let ds = normalize(&rows);
        let first = Summarizer::default().summarize(&ds);
        let second = Summarizer::default().summarize(&ds);
        prop_assert_eq!(first, second);
    }
}

// ── 5. Missing counts ────────────────────────────────────────────────

proptest! {
    #[test]
    fn missing_counts_follow_null_pattern(
        rows in prop::collection::vec((arb_row(), any::<bool>(), any::<bool>()), 1..60)
    ) {
        let labels = MonthLocale::Spanish.labels();
        let mut csv = String::from("Date;Asset;Month;Momentum;Volatility%;Volumen\n");
        for (r, ret_missing, volume_missing) in &rows {
            let ret = if *ret_missing { String::new() } else { r.ret.to_string() };
            let volume = if *volume_missing { "NA".to_string() } else { r.volume.to_string() };
            csv.push_str(&format!(
                "2024-01-01;{};{};{};{};{}\n",
                ASSETS[r.asset], labels[r.month], ret, r.range, volume
            ));
        }

        let raw = DataIngestor::default().ingest_reader(csv.as_bytes()).unwrap();
        let ds = Normalizer::default().normalize(raw).unwrap();
        let missing = assetlab_core::analysis::describe::missing_counts(&ds);

        prop_assert_eq!(missing.len(), ds.width());
        for (_, n) in &missing {
            prop_assert!(*n <= ds.height());
        }

        let expected_ret = rows.iter().filter(|(_, m, _)| *m).count();
        let expected_volume = rows.iter().filter(|(_, _, m)| *m).count();
        let count = |name: &str| missing.iter().find(|(c, _)| c == name).map(|(_, n)| *n);
        prop_assert_eq!(count("return"), Some(expected_ret));
        prop_assert_eq!(count("volume"), Some(expected_volume));
        prop_assert_eq!(count("asset"), Some(0));
        prop_assert_eq!(count("volatility_range"), Some(0));
        prop_assert_eq!(count("month_index"), Some(0));
    }
}
