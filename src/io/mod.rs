//! Input/output helpers.
//!
//! - JSON export of ranking lists and chart specs (`export`)

pub mod export;

pub use export::*;
