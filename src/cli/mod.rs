//! Command-line parsing for the 52-week low screener.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! HTTP, chart and rendering code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lowscan", version, about = "52-week low screener with industry candlestick charts")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Backend base URL (default: $LOWSCAN_API_URL, then http://localhost:8000).
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Write log output to this file instead of stderr (filter with RUST_LOG).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (the default when no subcommand is given).
    Tui,
    /// Print the 52-week low ranking.
    Yearlow(YearLowArgs),
    /// Print the industry peers of a stock with text candlestick charts.
    Industry(IndustryArgs),
    /// Ask the backend to analyze a ticker.
    Analyze(AnalyzeArgs),
    /// Render a chart JSON previously written with `industry --export`.
    Plot(PlotArgs),
}

#[derive(Debug, Args, Clone)]
pub struct YearLowArgs {
    /// Include markets outside 東証PRM / 東証STD / 東証GRT.
    #[arg(long)]
    pub all_markets: bool,

    /// Export the ranking rows to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct IndustryArgs {
    /// Instrument code whose industry should be charted (e.g. 7203).
    pub code: String,

    #[command(flatten)]
    pub chart: ChartArgs,

    /// Export the chart specs to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Ticker to analyze.
    pub ticker: String,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Chart JSON produced by `lowscan industry --export`.
    #[arg(long, value_name = "JSON")]
    pub charts: PathBuf,

    #[command(flatten)]
    pub chart: ChartArgs,
}

/// Text chart sizing.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Chart height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,

    /// Maximum number of bars drawn per chart (most recent first).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Print the summary only, without text charts.
    #[arg(long)]
    pub no_plot: bool,
}
