//! Industry chart data builder.
//!
//! Turns the flat `DailyBar` list returned for an industry into one chart
//! specification per instrument:
//!
//! - `build_groups`: partition by instrument code (stable within a group)
//! - `build_chart_spec`: padded price range + aligned volume/candle series
//! - `derive_industry_label`: first-seen industry label
//!
//! Everything here is pure and synchronous; the TUI, the CLI and the exporter
//! all go through `build_industry_charts`.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::domain::{
    CandlePoint, ChartSpec, DailyBar, IndustryCharts, InstrumentChart, PriceRange, VolumePoint,
};

/// Lower price-axis padding (2% below the lowest low).
pub const PRICE_PAD_LOW: f64 = 0.98;
/// Upper price-axis padding (2% above the highest high).
pub const PRICE_PAD_HIGH: f64 = 1.02;

/// Partition `records` by instrument code.
///
/// Records keep their relative input order inside each group; no date sort is
/// applied. Only codes present in the input appear in the output.
pub fn build_groups(records: &[DailyBar]) -> BTreeMap<String, Vec<DailyBar>> {
    let mut groups: BTreeMap<String, Vec<DailyBar>> = BTreeMap::new();
    for r in records {
        groups.entry(r.code.clone()).or_default().push(r.clone());
    }
    groups
}

/// Build the chart specification for one instrument series.
///
/// `series` must be non-empty; groups from [`build_groups`] always are.
pub fn build_chart_spec(series: &[DailyBar]) -> ChartSpec {
    debug_assert!(!series.is_empty(), "chart spec requested for an empty series");

    let min_low = series.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let max_high = series.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);

    let volume = series
        .iter()
        .map(|b| VolumePoint {
            date: b.date,
            volume: b.volume,
        })
        .collect();

    let candles = series
        .iter()
        .map(|b| CandlePoint {
            date: b.date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
        })
        .collect();

    ChartSpec {
        price_range: PriceRange {
            min: min_low * PRICE_PAD_LOW,
            max: max_high * PRICE_PAD_HIGH,
        },
        volume,
        candles,
    }
}

/// Industry label of the first bar, or `""` for an empty series.
///
/// Later bars are not checked against it.
pub fn derive_industry_label(series: &[DailyBar]) -> String {
    series.first().map(|b| b.industry.clone()).unwrap_or_default()
}

/// Build every chart panel for one industry response.
pub fn build_industry_charts(records: &[DailyBar]) -> IndustryCharts {
    let industry = derive_industry_label(records);
    let groups = build_groups(records);

    if log::log_enabled!(log::Level::Debug) {
        for (code, bars) in &groups {
            if bars.iter().any(|b| b.industry != industry) {
                log::debug!("instrument {code} carries an industry label other than '{industry}'");
            }
        }
    }

    let groups: Vec<(String, Vec<DailyBar>)> = groups.into_iter().collect();
    let panels = groups
        .into_par_iter()
        .map(|(code, bars)| InstrumentChart {
            name: bars.first().map(|b| b.name.clone()).unwrap_or_default(),
            spec: build_chart_spec(&bars),
            code,
        })
        .collect();

    IndustryCharts { industry, panels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn bar(code: &str, day: u32, low: f64, high: f64) -> DailyBar {
        DailyBar {
            code: code.to_string(),
            name: format!("name-{code}"),
            market: "東証PRM".to_string(),
            industry: "水産・農林業".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            open: low,
            high,
            low,
            close: high,
            volume: u64::from(day) * 100,
        }
    }

    #[test]
    fn groups_scenario_two_instruments() {
        let records = vec![bar("A", 1, 100.0, 110.0), bar("A", 2, 90.0, 120.0), bar("B", 1, 50.0, 60.0)];
        let groups = build_groups(&records);
        assert_eq!(groups.len(), 2);

        let spec = build_chart_spec(&groups["A"]);
        assert!((spec.price_range.min - 88.2).abs() < 1e-9);
        assert!((spec.price_range.max - 122.4).abs() < 1e-9);
        assert_eq!(spec.price_range.min, 0.98 * 90.0);
        assert_eq!(spec.price_range.max, 1.02 * 120.0);
    }

    #[test]
    fn empty_input_yields_no_groups_and_no_panels() {
        assert!(build_groups(&[]).is_empty());
        let charts = build_industry_charts(&[]);
        assert!(charts.panels.is_empty());
        assert_eq!(charts.industry, "");
    }

    #[test]
    fn groups_partition_input_and_keep_order() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let n = rng.gen_range(0..40);
            let mut records: Vec<DailyBar> = (0..n)
                .map(|i| {
                    let code = ["1301", "1332", "1333", "1375"][rng.gen_range(0..4)];
                    bar(code, (i % 28) as u32 + 1, 10.0 + i as f64, 20.0 + i as f64)
                })
                .collect();
            records.shuffle(&mut rng);

            let groups = build_groups(&records);
            let total: usize = groups.values().map(Vec::len).sum();
            assert_eq!(total, records.len());

            for (code, bars) in &groups {
                assert!(!bars.is_empty());
                let expected: Vec<&DailyBar> = records.iter().filter(|r| &r.code == code).collect();
                let actual: Vec<&DailyBar> = bars.iter().collect();
                assert_eq!(actual, expected);
            }
        }
    }

    #[test]
    fn chart_series_are_aligned_and_unsorted() {
        let records = vec![bar("A", 3, 10.0, 11.0), bar("A", 1, 9.0, 12.0), bar("A", 2, 8.0, 13.0)];
        let spec = build_chart_spec(&records);

        assert_eq!(spec.volume.len(), spec.candles.len());
        for (v, c) in spec.volume.iter().zip(&spec.candles) {
            assert_eq!(v.date, c.date);
        }
        let days: Vec<u32> = spec.candles.iter().map(|c| chrono::Datelike::day(&c.date)).collect();
        assert_eq!(days, vec![3, 1, 2]);
        assert_eq!(spec.volume[0].volume, 300);
    }

    #[test]
    fn industry_label_is_first_wins() {
        assert_eq!(derive_industry_label(&[]), "");

        let mut second = bar("B", 2, 1.0, 2.0);
        second.industry = "食料品".to_string();
        let records = vec![bar("A", 1, 1.0, 2.0), second];
        assert_eq!(derive_industry_label(&records), "水産・農林業");
    }

    #[test]
    fn industry_charts_follow_group_order() {
        let records = vec![bar("1375", 1, 5.0, 6.0), bar("1301", 1, 1.0, 2.0), bar("1375", 2, 4.0, 7.0)];
        let charts = build_industry_charts(&records);

        let codes: Vec<&str> = charts.panels.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["1301", "1375"]);
        assert_eq!(charts.panels[1].name, "name-1375");
        assert_eq!(charts.panels[1].spec.len(), 2);
        assert_eq!(charts.industry, "水産・農林業");
    }
}
