//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging and the backend client
//! - dispatches to the TUI or a one-shot subcommand

use std::fs::File;
use std::path::Path;

use clap::Parser;

use crate::cli::{AnalyzeArgs, ChartArgs, Command, IndustryArgs, PlotArgs, YearLowArgs};
use crate::data::{ApiConfig, StocksClient};
use crate::domain::IndustryCharts;
use crate::error::AppError;

pub mod pipeline;
pub mod view;

/// Entry point for the `lowscan` binary.
pub fn run() -> Result<(), AppError> {
    // `lowscan` and `lowscan --base-url URL` behave like `lowscan tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let interactive = matches!(cli.command, Command::Tui);
    init_logging(cli.global.log_file.as_deref(), interactive)?;
    log::debug!("command line: {cli:?}");

    let base_url = cli.global.base_url.clone();
    let connect = || -> Result<StocksClient, AppError> {
        let config = ApiConfig::resolve(base_url.as_deref())?;
        StocksClient::new(config)
    };

    match cli.command {
        Command::Tui => crate::tui::run(connect()?),
        Command::Yearlow(args) => handle_year_low(&connect()?, args),
        Command::Industry(args) => handle_industry(&connect()?, args),
        Command::Analyze(args) => handle_analyze(&connect()?, args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Install `env_logger`.
///
/// The filter comes from `RUST_LOG` (default `warn`). With `--log-file` the
/// output goes to that file; otherwise it goes to stderr, except in the TUI
/// where stderr would corrupt the alternate screen and logging stays off.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<(), AppError> {
    if interactive && log_file.is_none() {
        return Ok(());
    }

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .map_err(|e| AppError::config(format!("Failed to create log file '{}': {e}", path.display())))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // A second init (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
    Ok(())
}

fn handle_year_low(client: &StocksClient, args: YearLowArgs) -> Result<(), AppError> {
    let rows = pipeline::load_year_low(client, !args.all_markets)?;
    print!("{}", crate::report::format_year_low_table(&rows));

    if let Some(path) = &args.export {
        crate::io::write_year_low_json(path, &rows)?;
    }
    Ok(())
}

fn handle_industry(client: &StocksClient, args: IndustryArgs) -> Result<(), AppError> {
    let code = args.code.trim();
    if code.is_empty() {
        return Err(AppError::config("Instrument code must not be empty."));
    }

    let charts = pipeline::load_industry(client, code)?;
    print_charts(&charts, &args.chart);

    if let Some(path) = &args.export {
        crate::io::write_charts_json(path, &charts)?;
    }
    Ok(())
}

fn handle_analyze(client: &StocksClient, args: AnalyzeArgs) -> Result<(), AppError> {
    let ticker = args.ticker.trim();
    if ticker.is_empty() {
        return Err(AppError::config("Ticker must not be empty."));
    }

    let outcome = pipeline::analyze(client, ticker)?;
    print!("{}", crate::report::format_analysis(ticker, &outcome));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let charts = crate::io::read_charts_json(&args.charts)?;
    print_charts(&charts, &args.chart);
    Ok(())
}

fn print_charts(charts: &IndustryCharts, args: &ChartArgs) {
    print!("{}", crate::report::format_industry_summary(charts));
    if args.no_plot {
        return;
    }
    for panel in &charts.panels {
        println!();
        print!("{}", crate::plot::render_ascii_chart(panel, args.height, args.width));
    }
}

/// Rewrite argv so `lowscan` defaults to `lowscan tui`.
///
/// Rules:
/// - `lowscan`                      -> `lowscan tui`
/// - `lowscan --base-url URL ...`   -> `lowscan tui --base-url URL ...`
/// - `lowscan --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "yearlow" | "industry" | "analyze" | "plot"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
