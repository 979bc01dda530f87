//! Formatted terminal output: ranking table, industry summary, analysis.
//!
//! Formatting lives in one place so the data code stays free of layout
//! concerns and output changes stay localized.
//!
//! Columns holding Japanese text (market, name) are placed last so that
//! double-width glyphs never shift the numeric columns.

use crate::domain::{AnalyzeOutcome, IndustryCharts, YearLowRecord};

/// Format the 52-week low ranking table.
pub fn format_year_low_table(rows: &[YearLowRecord]) -> String {
    if rows.is_empty() {
        return "No stocks in the 52-week low ranking.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} {:<6} {:>12} {:>12} {:<10} {:>12}  {:<8} {}\n",
        "rank", "code", "price", "52w low", "low date", "prev close", "market", "name"
    ));
    out.push_str(&format!(
        "{:-<4} {:-<6} {:-<12} {:-<12} {:-<10} {:-<12}  {:-<8} {:-<4}\n",
        "", "", "", "", "", "", "", ""
    ));

    for r in rows {
        out.push_str(
            format!(
                "{:>4} {:<6} {:>12} {:>12} {:<10} {:>12}  {} {}\n",
                r.rank,
                r.code,
                format_price(r.current_price),
                format_price(r.year_low_price),
                r.year_low_date,
                format_price(r.prev_close),
                r.market,
                r.name,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the header and one summary line per chart panel.
pub fn format_industry_summary(charts: &IndustryCharts) -> String {
    let mut out = String::new();
    out.push_str(&format!("Industry: {}\n", display_or_dash(&charts.industry)));

    if charts.panels.is_empty() {
        out.push_str("No instruments returned.\n");
        return out;
    }

    for panel in &charts.panels {
        let spec = &panel.spec;
        let dates = match (spec.candles.first(), spec.candles.last()) {
            (Some(first), Some(last)) => format!("{} .. {}", first.date, last.date),
            _ => "-".to_string(),
        };
        out.push_str(&format!(
            "{} - {} | bars={} | {} | price=[{}, {}] | max vol={}\n",
            panel.code,
            panel.name,
            spec.len(),
            dates,
            format_price(spec.price_range.min),
            format_price(spec.price_range.max),
            format_with_commas(spec.max_volume()),
        ));
    }

    out
}

/// Format an analyze outcome.
pub fn format_analysis(ticker: &str, outcome: &AnalyzeOutcome) -> String {
    match outcome {
        AnalyzeOutcome::Text(text) => format!("Analysis of {ticker}:\n{text}\n"),
        AnalyzeOutcome::Message(message) => format!("{ticker}: {message}\n"),
        AnalyzeOutcome::Listing(rows) => {
            if rows.is_empty() {
                return format!("{ticker}: no matching stocks.\n");
            }
            let mut out = format!("{:<6} {:>12} {:<10} {}\n", "code", "price", "report", "name");
            for r in rows {
                out.push_str(&format!(
                    "{:<6} {:>12} {:<10} {}\n",
                    r.code,
                    format_price(r.price),
                    r.report_date,
                    r.name
                ));
            }
            out
        }
    }
}

/// Price with thousands separators; fractional digits only when present.
pub fn format_price(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let rounded = (v * 100.0).round() / 100.0;
    let int_part = rounded.trunc().abs() as u64;
    let cents = ((rounded.abs() - rounded.abs().trunc()) * 100.0).round() as u64;
    let sign = if rounded < 0.0 { "-" } else { "" };
    if cents == 0 {
        format!("{sign}{}", format_with_commas(int_part))
    } else if cents % 10 == 0 {
        format!("{sign}{}.{}", format_with_commas(int_part), cents / 10)
    } else {
        format!("{sign}{}.{cents:02}", format_with_commas(int_part))
    }
}

pub fn format_with_commas(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn display_or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartSpec, InstrumentChart, PriceRange, StockInfo};

    fn record(rank: u32, code: &str) -> YearLowRecord {
        YearLowRecord {
            rank,
            name: "極洋".to_string(),
            code: code.to_string(),
            market: "東証PRM".to_string(),
            current_price: 4125.0,
            year_low_price: 3980.5,
            year_low_date: "2025-04-07".to_string(),
            prev_close: 4130.0,
        }
    }

    #[test]
    fn price_formatting_matches_locale_style() {
        assert_eq!(format_price(4125.0), "4,125");
        assert_eq!(format_price(3980.5), "3,980.5");
        assert_eq!(format_price(1234567.25), "1,234,567.25");
        assert_eq!(format_price(88.2), "88.2");
        assert_eq!(format_price(-1500.0), "-1,500");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1000), "1,000");
    }

    #[test]
    fn year_low_table_lists_rows_in_order() {
        let txt = format_year_low_table(&[record(1, "1301"), record(2, "1332")]);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("rank code"));
        assert!(lines[2].contains("1301") && lines[2].contains("3,980.5") && lines[2].ends_with("東証PRM 極洋"));
        assert!(lines[3].starts_with("   2 1332"));
    }

    #[test]
    fn empty_ranking_has_a_message() {
        assert_eq!(format_year_low_table(&[]), "No stocks in the 52-week low ranking.\n");
    }

    #[test]
    fn industry_summary_handles_no_panels() {
        let charts = IndustryCharts::default();
        assert_eq!(format_industry_summary(&charts), "Industry: -\nNo instruments returned.\n");

        let charts = IndustryCharts {
            industry: "水産・農林業".to_string(),
            panels: vec![InstrumentChart {
                code: "1301".to_string(),
                name: "極洋".to_string(),
                spec: ChartSpec {
                    price_range: PriceRange { min: 88.2, max: 122.4 },
                    volume: Vec::new(),
                    candles: Vec::new(),
                },
            }],
        };
        let txt = format_industry_summary(&charts);
        assert!(txt.starts_with("Industry: 水産・農林業\n"));
        assert!(txt.contains("1301 - 極洋 | bars=0 | - | price=[88.2, 122.4] | max vol=0"));
    }

    #[test]
    fn analysis_variants_are_rendered_distinctly() {
        assert_eq!(
            format_analysis("7203", &AnalyzeOutcome::Text("様子見".to_string())),
            "Analysis of 7203:\n様子見\n"
        );
        assert_eq!(
            format_analysis("7203", &AnalyzeOutcome::Message("not found".to_string())),
            "7203: not found\n"
        );
        assert_eq!(
            format_analysis("7203", &AnalyzeOutcome::Listing(Vec::new())),
            "7203: no matching stocks.\n"
        );

        let listing = AnalyzeOutcome::Listing(vec![StockInfo {
            code: "7203".to_string(),
            name: "トヨタ自動車".to_string(),
            price: 2840.0,
            report_date: "2025-05-08".to_string(),
        }]);
        let txt = format_analysis("7203", &listing);
        assert!(txt.lines().nth(1).unwrap().starts_with("7203          2,840 2025-05-08"));
    }
}
