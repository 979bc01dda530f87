//! HTTP integration with the stocks backend.
//!
//! Three endpoints are consumed:
//!
//! - `GET  /api/stocks/yearlow`        -> `{ "data": [YearLowRecord] }`
//! - `GET  /api/stocks/industry/{code}` -> `[CombinedRecord]`
//! - `POST /api/stocks/analyze`         -> `{ "text" }`, `{ "data" }` or `{ "message" }`

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{AnalyzeOutcome, DailyBar, StockInfo, YearLowRecord};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "LOWSCAN_API_URL";

const USER_AGENT: &str = concat!("lowscan/", env!("CARGO_PKG_VERSION"));

/// Failures talking to the backend, each reducible to one display string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-2xx response; `detail` is the backend's explanation when it sent one.
    #[error("{}", status_message(.status, .detail))]
    Status { status: u16, detail: Option<String> },

    /// The body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Shape(String),
}

fn status_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!("HTTP {status}: {detail}"),
        None => format!("HTTP {status}"),
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::backend(err.to_string())
    }
}

/// Where the backend lives.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    /// Resolve the base URL: explicit override, then `LOWSCAN_API_URL`
    /// (`.env` is honored), then [`DEFAULT_BASE_URL`].
    pub fn resolve(base_url: Option<&str>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let raw = match base_url {
            Some(url) => url.to_string(),
            None => std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(raw.trim())
            .map_err(|e| AppError::config(format!("Invalid API base URL '{raw}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::config(format!("API base URL '{raw}' cannot carry a path.")));
        }
        Ok(Self { base_url })
    }

    /// Build `{base}/api/stocks/{segments...}`; each segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "stocks"]).extend(segments);
        }
        url
    }
}

/// Blocking client for the stocks backend.
///
/// Cloning is cheap; clones share the underlying connection pool, which lets
/// the TUI hand a copy to each worker thread.
#[derive(Debug, Clone)]
pub struct StocksClient {
    client: Client,
    config: ApiConfig,
}

impl StocksClient {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Fetch the full 52-week low ranking (unfiltered).
    pub fn fetch_year_low(&self) -> Result<Vec<YearLowRecord>, ApiError> {
        #[derive(Deserialize)]
        struct YearLowResponse {
            data: Vec<YearLowRecord>,
        }

        let url = self.config.endpoint(&["yearlow"]);
        log::debug!("GET {url}");
        let resp = self.client.get(url.clone()).send().map_err(transport)?;
        let body: YearLowResponse = decode(resp, &url)?;
        log::info!("year-low ranking: {} record(s)", body.data.len());
        Ok(body.data)
    }

    /// Fetch daily bars for every instrument in `code`'s industry.
    pub fn fetch_industry(&self, code: &str) -> Result<Vec<DailyBar>, ApiError> {
        let url = self.config.endpoint(&["industry", code.trim()]);
        log::debug!("GET {url}");
        let resp = self.client.get(url.clone()).send().map_err(transport)?;
        let bars: Vec<DailyBar> = decode(resp, &url)?;
        log::info!("industry of {code}: {} bar(s)", bars.len());
        Ok(bars)
    }

    /// Ask the backend to analyze `ticker`.
    pub fn analyze(&self, ticker: &str) -> Result<AnalyzeOutcome, ApiError> {
        let url = self.config.endpoint(&["analyze"]);
        log::debug!("POST {url} ticker={ticker}");
        let resp = self
            .client
            .post(url.clone())
            .json(&serde_json::json!({ "ticker": ticker }))
            .send()
            .map_err(transport)?;
        let body: Value = decode(resp, &url)?;
        classify_analysis(body)
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    log::warn!("transport failure: {err}");
    ApiError::Transport(err.to_string())
}

/// Check the status, then decode the body as `T`.
fn decode<T: DeserializeOwned>(resp: Response, url: &Url) -> Result<T, ApiError> {
    let status = resp.status();
    let text = resp.text().map_err(transport)?;

    if !status.is_success() {
        let detail = error_detail(&text);
        log::warn!("{url} returned {status}");
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_str(&text).map_err(|e| {
        log::warn!("{url} returned an undecodable body: {e}");
        ApiError::Shape(e.to_string())
    })
}

/// Extract a readable message from a FastAPI-style error body.
///
/// `detail` may be a string or a list of validation errors with `msg` fields.
pub fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Discriminate the analyze response by its keys.
///
/// Precedence: `text` string, then `data` array, then `message` string.
pub fn classify_analysis(body: Value) -> Result<AnalyzeOutcome, ApiError> {
    let Value::Object(mut map) = body else {
        return Err(ApiError::Shape("analysis response is not a JSON object".to_string()));
    };

    if let Some(Value::String(text)) = map.remove("text") {
        return Ok(AnalyzeOutcome::Text(text));
    }
    if let Some(data @ Value::Array(_)) = map.remove("data") {
        let rows: Vec<StockInfo> =
            serde_json::from_value(data).map_err(|e| ApiError::Shape(format!("analysis data: {e}")))?;
        return Ok(AnalyzeOutcome::Listing(rows));
    }
    if let Some(Value::String(message)) = map.remove("message") {
        return Ok(AnalyzeOutcome::Message(message));
    }

    Err(ApiError::Shape(
        "analysis response has none of 'text', 'data' or 'message'".to_string(),
    ))
}
