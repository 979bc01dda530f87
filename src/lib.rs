//! `lowscan` library crate.
//!
//! The binary (`lowscan`) is a thin wrapper around this library so that:
//!
//! - the chart builder and response handling are testable without a terminal
//! - the CLI and the TUI share one set of workflows (`app::pipeline`)

pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
