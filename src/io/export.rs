//! JSON exports.
//!
//! The chart export is the "portable" form of an industry response: the
//! industry label plus one chart spec per instrument, ready for any renderer.
//! `lowscan plot` reads it back for offline viewing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{IndustryCharts, YearLowRecord};
use crate::error::AppError;

/// Write industry chart panels to a JSON file.
pub fn write_charts_json(path: &Path, charts: &IndustryCharts) -> Result<(), AppError> {
    write_json(path, charts)?;
    log::info!("wrote {} chart panel(s) to {}", charts.panels.len(), path.display());
    Ok(())
}

/// Read a chart export written by [`write_charts_json`].
pub fn read_charts_json(path: &Path) -> Result<IndustryCharts, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open chart JSON '{}': {e}", path.display())))?;
    let charts: IndustryCharts =
        serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid chart JSON: {e}")))?;
    Ok(charts)
}

/// Write the ranking rows to a JSON file.
pub fn write_year_low_json(path: &Path, rows: &[YearLowRecord]) -> Result<(), AppError> {
    write_json(path, &rows)?;
    log::info!("wrote {} ranking row(s) to {}", rows.len(), path.display());
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create '{}': {e}", path.display())))?;
    let fail = |e: &dyn std::fmt::Display| AppError::config(format!("Failed to write '{}': {e}", path.display()));
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| fail(&e))?;
    writer.flush().map_err(|e| fail(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::chart::build_industry_charts;
    use crate::domain::DailyBar;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lowscan_{}_{name}", std::process::id()))
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn export_to_full_device_fails() {
        let result = write_charts_json(Path::new("/dev/full"), &IndustryCharts::default());
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("/dev/full"));
    }

    #[test]
    fn chart_export_reads_back() {
        let bars = vec![DailyBar {
            code: "1301".to_string(),
            name: "極洋".to_string(),
            market: "東証PRM".to_string(),
            industry: "水産・農林業".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            open: 4100.0,
            high: 4150.0,
            low: 4080.0,
            close: 4125.0,
            volume: 35_200,
        }];
        let charts = build_industry_charts(&bars);

        let path = temp_path("charts.json");
        write_charts_json(&path, &charts).unwrap();
        let back = read_charts_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.industry, "水産・農林業");
        assert_eq!(back.panels.len(), 1);
        let (a, b) = (&back.panels[0], &charts.panels[0]);
        assert_eq!(a.code, b.code);
        assert_eq!(a.spec.candles, b.spec.candles);
        assert_eq!(a.spec.volume, b.spec.volume);
        assert!((a.spec.price_range.min - b.spec.price_range.min).abs() < 1e-9);
        assert!((a.spec.price_range.max - b.spec.price_range.max).abs() < 1e-9);
    }

    #[test]
    fn ranking_export_is_a_json_array() {
        let path = temp_path("yearlow.json");
        write_year_low_json(&path, &[]).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(raw.trim(), "[]");
    }

    #[test]
    fn missing_chart_file_is_a_config_error() {
        let err = read_charts_json(Path::new("/nonexistent/lowscan/charts.json")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }
}
