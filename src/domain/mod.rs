//! Domain types used throughout the client.
//!
//! This module defines:
//!
//! - wire records from the stocks backend (`DailyBar`, `YearLowRecord`, `StockInfo`)
//! - the analyze endpoint's tagged response (`AnalyzeOutcome`)
//! - derived chart artifacts (`ChartSpec`, `InstrumentChart`, `IndustryCharts`)

pub mod types;

pub use types::*;
