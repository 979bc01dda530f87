//! Data sources.
//!
//! - `api`: blocking client for the stocks backend

pub mod api;

pub use api::{ApiConfig, ApiError, StocksClient};
