//! ASCII/Unicode candlestick plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-height grid, one column per bar),
//! optimized for quick visual checks and deterministic golden tests.
//!
//! Plot elements:
//! - wick: `│`
//! - rising body (close >= open): `█`
//! - falling body: `░`
//! - volume strip under the candles: `▁` .. `█`

use crate::domain::{CandlePoint, InstrumentChart};
use crate::report::{format_price, format_with_commas};

const VOLUME_LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render one instrument's chart.
///
/// When the series has more than `max_columns` bars only the most recent
/// `max_columns` are drawn; the price axis still uses the spec's full range.
pub fn render_ascii_chart(chart: &InstrumentChart, height: usize, max_columns: usize) -> String {
    let spec = &chart.spec;
    let mut out = String::new();

    if spec.is_empty() {
        out.push_str(&format!("{} - {} | no data\n", chart.code, chart.name));
        return out;
    }

    let height = height.max(3);
    let skip = spec.len().saturating_sub(max_columns.max(1));
    let candles = &spec.candles[skip..];
    let volumes = &spec.volume[skip..];
    let y_min = spec.price_range.min;
    let y_max = spec.price_range.max;

    let mut grid = vec![vec![' '; candles.len()]; height];
    for (x, c) in candles.iter().enumerate() {
        draw_candle(&mut grid, x, c, y_min, y_max);
    }

    let max_volume = volumes.iter().map(|v| v.volume).max().unwrap_or(0);
    let strip: String = volumes
        .iter()
        .map(|v| VOLUME_LEVELS[volume_level(v.volume, max_volume)])
        .collect();

    out.push_str(&format!(
        "{} - {} | price=[{}, {}] | vol max={}\n",
        chart.code,
        chart.name,
        format_price(y_min),
        format_price(y_max),
        format_with_commas(max_volume),
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&strip);
    out.push('\n');

    if let (Some(first), Some(last)) = (candles.first(), candles.last()) {
        out.push_str(&format!("{} .. {}\n", first.date, last.date));
    }

    out
}

fn draw_candle(grid: &mut [Vec<char>], x: usize, c: &CandlePoint, y_min: f64, y_max: f64) {
    let height = grid.len();
    let top = map_y(c.high, y_min, y_max, height);
    let bottom = map_y(c.low, y_min, y_max, height);
    for row in grid.iter_mut().take(bottom.max(top) + 1).skip(top.min(bottom)) {
        row[x] = '│';
    }

    let body = if c.is_up() { '█' } else { '░' };
    let body_top = map_y(c.open.max(c.close), y_min, y_max, height);
    let body_bottom = map_y(c.open.min(c.close), y_min, y_max, height);
    for row in grid.iter_mut().take(body_bottom + 1).skip(body_top) {
        row[x] = body;
    }
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = if y_max > y_min {
        ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn volume_level(volume: u64, max_volume: u64) -> usize {
    if max_volume == 0 {
        return 0;
    }
    let u = volume as f64 / max_volume as f64;
    ((u * (VOLUME_LEVELS.len() - 1) as f64).round() as usize).min(VOLUME_LEVELS.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{ChartSpec, PriceRange, VolumePoint};

    fn chart(candles: &[(f64, f64, f64, f64, u64)]) -> InstrumentChart {
        let day = |i: usize| NaiveDate::from_ymd_opt(2025, 1, 6 + i as u32).unwrap();
        InstrumentChart {
            code: "1301".to_string(),
            name: "極洋".to_string(),
            spec: ChartSpec {
                price_range: PriceRange { min: 8.0, max: 12.0 },
                volume: candles
                    .iter()
                    .enumerate()
                    .map(|(i, c)| VolumePoint { date: day(i), volume: c.4 })
                    .collect(),
                candles: candles
                    .iter()
                    .enumerate()
                    .map(|(i, c)| CandlePoint {
                        date: day(i),
                        open: c.0,
                        high: c.1,
                        low: c.2,
                        close: c.3,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let chart = chart(&[
            (9.0, 11.0, 8.0, 10.0, 100),
            (11.0, 12.0, 10.0, 10.0, 400),
            (10.0, 10.0, 9.0, 10.0, 0),
        ]);

        let txt = render_ascii_chart(&chart, 5, 100);
        let expected = concat!(
            "1301 - 極洋 | price=[8, 12] | vol max=400\n",
            " │ \n",
            "│░ \n",
            "█░█\n",
            "█ │\n",
            "│  \n",
            "▂█ \n",
            "2025-01-06 .. 2025-01-08\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn only_most_recent_columns_are_drawn() {
        let chart = chart(&[
            (9.0, 11.0, 8.0, 10.0, 100),
            (11.0, 12.0, 10.0, 10.0, 400),
            (10.0, 10.0, 9.0, 10.0, 200),
        ]);
        let txt = render_ascii_chart(&chart, 5, 2);
        let lines: Vec<&str> = txt.lines().collect();
        assert!(lines.iter().skip(1).take(5).all(|l| l.chars().count() == 2));
        assert_eq!(lines[6], "█▄");
        assert_eq!(lines[7], "2025-01-07 .. 2025-01-08");
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        let txt = render_ascii_chart(&chart(&[]), 5, 10);
        assert_eq!(txt, "1301 - 極洋 | no data\n");
    }
}
