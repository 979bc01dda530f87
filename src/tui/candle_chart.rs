//! Plotters-powered candlestick + volume chart widget for Ratatui.
//!
//! The price pane sits on top of the volume pane and both share the same
//! x axis: bar index `i` is drawn at `x = i`, and tick labels map the index
//! back to its date. Because `ChartSpec` keeps volume and candle dates
//! aligned, no re-alignment happens here.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// The explicit ratatui `Color` below shadows the prelude's trait; keep its methods.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{CandlePoint, ChartSpec};
use crate::report::format_price;

const UP_COLOR: RGBColor = RGBColor(38, 166, 154);
const DOWN_COLOR: RGBColor = RGBColor(239, 83, 80);
const VOLUME_COLOR: RGBColor = RGBColor(59, 130, 246);
/// Half the body/bar width, in bar-index units.
const HALF_BAR: f64 = 0.3;

/// A render-only chart for one instrument; all bounds come from the spec.
pub struct CandleChart<'a> {
    pub spec: &'a ChartSpec,
}

impl<'a> Widget for CandleChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 24 || area.height < 12 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let spec = self.spec;
        if spec.is_empty() {
            return;
        }

        let y0 = spec.price_range.min;
        let y1 = spec.price_range.max;
        if !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
            buf.set_string(
                area.x,
                area.y,
                "Price range is not drawable.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = -0.5;
        let x1 = spec.len() as f64 - 0.5;
        let v1 = (spec.max_volume() as f64 * 1.05).max(1.0);
        let candles = spec.candles.as_slice();

        let [price_area, volume_area] =
            Layout::vertical([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(area);

        // Wicks and bodies are drawn as coordinate-space paths/rectangles rather
        // than Plotters' `CandleStick`, whose pixel widths do not map onto the
        // terminal canvas.
        let price = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(0)
                .y_labels(5)
                .y_desc("price")
                .y_label_formatter(&|v| format_price(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            chart.draw_series(candles.iter().enumerate().map(|(i, c)| {
                PathElement::new(
                    vec![(i as f64, c.low), (i as f64, c.high)],
                    candle_color(c).stroke_width(1),
                )
            }))?;
            chart.draw_series(candles.iter().enumerate().map(|(i, c)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - HALF_BAR, c.open), (x + HALF_BAR, c.close)],
                    candle_color(c).filled(),
                )
            }))?;

            Ok(())
        });

        let volume = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, 0.0..v1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(2)
                .x_label_formatter(&|v| date_label(candles, *v))
                .y_label_formatter(&|v| format_compact(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            chart.draw_series(spec.volume.iter().enumerate().map(|(i, v)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - HALF_BAR, 0.0), (x + HALF_BAR, v.volume as f64)],
                    VOLUME_COLOR.filled(),
                )
            }))?;

            Ok(())
        });

        price.render(price_area, buf);
        volume.render(volume_area, buf);
    }
}

fn candle_color(c: &CandlePoint) -> RGBColor {
    if c.is_up() { UP_COLOR } else { DOWN_COLOR }
}

/// Tick label for a bar-index coordinate; blank between bars.
fn date_label(candles: &[CandlePoint], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    candles
        .get(i as usize)
        .map(|c| c.date.format("%m/%d").to_string())
        .unwrap_or_default()
}

fn format_compact(v: f64) -> String {
    if v >= 1_000_000_000.0 {
        format!("{:.1}B", v / 1_000_000_000.0)
    } else if v >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candle(day: u32) -> CandlePoint {
        CandlePoint {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
        }
    }

    #[test]
    fn date_labels_only_on_bar_positions() {
        let candles = vec![candle(3), candle(4)];
        assert_eq!(date_label(&candles, 0.0), "03/03");
        assert_eq!(date_label(&candles, 1.0), "03/04");
        assert_eq!(date_label(&candles, 0.5), "");
        assert_eq!(date_label(&candles, -0.5), "");
        assert_eq!(date_label(&candles, 2.0), "");
    }

    #[test]
    fn compact_volume_labels() {
        assert_eq!(format_compact(950.0), "950");
        assert_eq!(format_compact(35_200.0), "35.2K");
        assert_eq!(format_compact(4_500_000.0), "4.5M");
    }
}
