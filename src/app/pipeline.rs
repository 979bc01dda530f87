//! Shared workflows used by both CLI and TUI front-ends.
//!
//! Each function is one user action: fetch, then shape the payload the panel
//! shows. The front-ends only deal with presentation.

use crate::chart::build_industry_charts;
use crate::data::{ApiError, StocksClient};
use crate::domain::{AnalyzeOutcome, IndustryCharts, YearLowRecord, filter_listed_markets};

/// Fetch the 52-week low ranking, optionally restricted to the listed markets.
pub fn load_year_low(client: &StocksClient, listed_only: bool) -> Result<Vec<YearLowRecord>, ApiError> {
    let records = client.fetch_year_low()?;
    if !listed_only {
        return Ok(records);
    }
    let total = records.len();
    let kept = filter_listed_markets(records);
    log::debug!("market filter kept {} of {total} record(s)", kept.len());
    Ok(kept)
}

/// Fetch `code`'s industry and build one chart panel per instrument.
pub fn load_industry(client: &StocksClient, code: &str) -> Result<IndustryCharts, ApiError> {
    let bars = client.fetch_industry(code)?;
    Ok(build_industry_charts(&bars))
}

/// Run the analyze query for `ticker`.
///
/// Callers reject blank tickers before getting here.
pub fn analyze(client: &StocksClient, ticker: &str) -> Result<AnalyzeOutcome, ApiError> {
    client.analyze(ticker.trim())
}
