//! Shared domain types.
//!
//! Wire types mirror the backend's JSON field names through serde renames so the
//! rest of the crate can use ordinary Rust naming.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Market labels shown in the ranking table.
pub const LISTED_MARKETS: [&str; 3] = ["東証PRM", "東証STD", "東証GRT"];

/// One instrument's trading data for one calendar date.
///
/// This is the `CombinedRecord` row of `GET /api/stocks/industry/{code}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub code: String,
    pub name: String,
    pub market: String,
    #[serde(rename = "industry_33_category")]
    pub industry: String,
    #[serde(rename = "Date", deserialize_with = "de_iso_date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume", deserialize_with = "de_volume")]
    pub volume: u64,
}

/// One row of the 52-week low ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearLowRecord {
    pub rank: u32,
    pub name: String,
    pub code: String,
    pub market: String,
    pub current_price: f64,
    pub year_low_price: f64,
    pub year_low_date: String,
    pub prev_close: f64,
}

impl YearLowRecord {
    /// Whether this record belongs to one of the [`LISTED_MARKETS`].
    pub fn is_listed_market(&self) -> bool {
        LISTED_MARKETS.contains(&self.market.as_str())
    }
}

/// Keep only records from the markets shown in the ranking table.
pub fn filter_listed_markets(records: Vec<YearLowRecord>) -> Vec<YearLowRecord> {
    records.into_iter().filter(YearLowRecord::is_listed_market).collect()
}

/// Structured row returned by the listing variant of the analyze endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockInfo {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub report_date: String,
}

/// Response of `POST /api/stocks/analyze`.
///
/// The backend has shipped two incompatible shapes for this screen; both are
/// accepted and kept distinct.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum AnalyzeOutcome {
    /// `{ "text": "..." }`: free-text analysis.
    Text(String),
    /// `{ "data": [StockInfo, ...] }`.
    Listing(Vec<StockInfo>),
    /// `{ "message": "..." }`.
    Message(String),
}

/// Inclusive price-axis bounds for one chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub date: NaiveDate,
    pub volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl CandlePoint {
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Renderer-agnostic chart description for one instrument.
///
/// `volume` and `candles` always have the same length and the same dates in
/// the same order, so they can share one time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub price_range: PriceRange,
    pub volume: Vec<VolumePoint>,
    pub candles: Vec<CandlePoint>,
}

impl ChartSpec {
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn max_volume(&self) -> u64 {
        self.volume.iter().map(|v| v.volume).max().unwrap_or(0)
    }
}

/// One chart panel: an instrument and its chart spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentChart {
    pub code: String,
    pub name: String,
    pub spec: ChartSpec,
}

/// All chart panels built from one industry response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndustryCharts {
    pub industry: String,
    pub panels: Vec<InstrumentChart>,
}

/// Accept `YYYY-MM-DD`, optionally followed by a time component
/// (`2025-01-06T00:00:00`, `2025-01-06 00:00:00`).
fn de_iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_iso_date(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    let day = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| format!("invalid date '{raw}': {e}"))
}

/// Volumes arrive as integers, or as integral floats when the backend
/// serializes a float column.
fn de_volume<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawVolume {
        Int(u64),
        Float(f64),
    }

    match RawVolume::deserialize(deserializer)? {
        RawVolume::Int(v) => Ok(v),
        RawVolume::Float(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as u64),
        RawVolume::Float(v) => Err(serde::de::Error::custom(format!("invalid volume {v}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(market: &str) -> YearLowRecord {
        YearLowRecord {
            rank: 1,
            name: "Sample".to_string(),
            code: "1301".to_string(),
            market: market.to_string(),
            current_price: 100.0,
            year_low_price: 95.0,
            year_low_date: "2025-01-06".to_string(),
            prev_close: 101.0,
        }
    }

    #[test]
    fn daily_bar_decodes_wire_names() {
        let json = r#"{
            "code": "7203", "name": "Toyota", "market": "東証PRM",
            "industry_33_category": "輸送用機器", "Date": "2025-01-06T00:00:00",
            "Open": 2800.0, "High": 2850.5, "Low": 2790.0, "Close": 2840.0, "Volume": 1200.0
        }"#;
        let bar: DailyBar = serde_json::from_str(json).unwrap();
        assert_eq!(bar.industry, "輸送用機器");
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(bar.volume, 1200);
        assert!((bar.high - 2850.5).abs() < 1e-12);
    }

    #[test]
    fn fractional_volume_is_rejected() {
        let json = r#"{
            "code": "7203", "name": "Toyota", "market": "東証PRM",
            "industry_33_category": "輸送用機器", "Date": "2025-01-06",
            "Open": 1.0, "High": 1.0, "Low": 1.0, "Close": 1.0, "Volume": 12.5
        }"#;
        assert!(serde_json::from_str::<DailyBar>(json).is_err());
    }

    #[test]
    fn parse_iso_date_accepts_space_separated_time() {
        let d = parse_iso_date("2024-12-30 00:00:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
        assert!(parse_iso_date("30/12/2024").is_err());
    }

    #[test]
    fn market_filter_excludes_unlisted_labels() {
        let records = vec![record("東証PRM"), record("東証グロース"), record("東証GRT"), record("東証STD")];
        let kept = filter_listed_markets(records);
        let markets: Vec<&str> = kept.iter().map(|r| r.market.as_str()).collect();
        assert_eq!(markets, vec!["東証PRM", "東証GRT", "東証STD"]);
    }
}
