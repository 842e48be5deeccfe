//! SVG chart rendering for the dashboard report.
//!
//! Each generator returns a standalone `<svg>` document, or an empty string
//! when there is nothing to draw.

use crate::domain::dashboard::CumulativeChart;
use crate::domain::ranking::RankedSecurity;
use chrono::NaiveDate;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 260.0;
const PAD_LEFT: f64 = 60.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_TOP: f64 = 20.0;
const PAD_BOTTOM: f64 = 40.0;

const LINE_COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

struct Frame {
    min: f64,
    max: f64,
    steps: usize,
}

impl Frame {
    fn new(min: f64, max: f64, steps: usize) -> Self {
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            (min - 1.0, max + 1.0)
        } else {
            (min, max)
        };
        Self { min, max, steps }
    }

    fn plot_w() -> f64 {
        WIDTH - PAD_LEFT - PAD_RIGHT
    }

    fn plot_h() -> f64 {
        HEIGHT - PAD_TOP - PAD_BOTTOM
    }

    fn x(&self, i: usize) -> f64 {
        if self.steps <= 1 {
            PAD_LEFT + Self::plot_w() / 2.0
        } else {
            PAD_LEFT + i as f64 * Self::plot_w() / (self.steps - 1) as f64
        }
    }

    fn y(&self, v: f64) -> f64 {
        PAD_TOP + (self.max - v) / (self.max - self.min) * Self::plot_h()
    }
}

fn open_svg(out: &mut String) {
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="10">"#
    ));
    out.push_str(&format!(
        r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#
    ));
}

fn axes(out: &mut String, frame: &Frame, fmt: fn(f64) -> String) {
    let bottom = HEIGHT - PAD_BOTTOM;
    out.push_str(&format!(
        r##"<line x1="{PAD_LEFT}" y1="{PAD_TOP}" x2="{PAD_LEFT}" y2="{bottom}" stroke="#333"/>"##
    ));
    out.push_str(&format!(
        r##"<line x1="{PAD_LEFT}" y1="{bottom}" x2="{:.1}" y2="{bottom}" stroke="#333"/>"##,
        WIDTH - PAD_RIGHT
    ));
    for v in [frame.min, (frame.min + frame.max) / 2.0, frame.max] {
        out.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            PAD_LEFT - 4.0,
            frame.y(v) + 3.0,
            fmt(v)
        ));
    }
}

fn date_labels(out: &mut String, frame: &Frame, dates: &[NaiveDate]) {
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return;
    };
    let y = HEIGHT - PAD_BOTTOM + 14.0;
    out.push_str(&format!(
        r#"<text x="{:.1}" y="{y:.1}" text-anchor="start">{first}</text>"#,
        frame.x(0)
    ));
    if dates.len() > 1 {
        out.push_str(&format!(
            r#"<text x="{:.1}" y="{y:.1}" text-anchor="end">{last}</text>"#,
            frame.x(dates.len() - 1)
        ));
    }
}

fn polyline(points: &[(f64, f64)], color: &str) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect();
    format!(
        r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{}"/>"#,
        coords.join(" ")
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn price_label(v: f64) -> String {
    format!("{v:.2}")
}

fn pct_label(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

/// Close price over time for one security.
pub fn generate_price_svg(series: &[(NaiveDate, f64)]) -> String {
    if series.is_empty() {
        return String::new();
    }
    let min = series.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max = series.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let frame = Frame::new(min, max, series.len());

    let mut out = String::new();
    open_svg(&mut out);
    axes(&mut out, &frame, price_label);
    let dates: Vec<NaiveDate> = series.iter().map(|p| p.0).collect();
    date_labels(&mut out, &frame, &dates);
    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, &(_, v))| (frame.x(i), frame.y(v)))
        .collect();
    out.push_str(&polyline(&points, LINE_COLORS[0]));
    out.push_str("</svg>");
    out
}

/// One line per leader; a gap in a leader's data splits its line.
pub fn generate_cumulative_svg(chart: &CumulativeChart) -> String {
    let values = chart.cells.iter().flatten().flatten().copied();
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if chart.tickers.is_empty() || !min.is_finite() {
        return String::new();
    }
    let frame = Frame::new(min.min(0.0), max.max(0.0), chart.dates.len());

    let mut out = String::new();
    open_svg(&mut out);
    axes(&mut out, &frame, pct_label);
    date_labels(&mut out, &frame, &chart.dates);

    let zero = frame.y(0.0);
    out.push_str(&format!(
        r##"<line x1="{PAD_LEFT}" y1="{zero:.1}" x2="{:.1}" y2="{zero:.1}" stroke="#bbb" stroke-dasharray="4 3"/>"##,
        WIDTH - PAD_RIGHT
    ));

    for (col, ticker) in chart.tickers.iter().enumerate() {
        let color = LINE_COLORS[col % LINE_COLORS.len()];
        let mut segment: Vec<(f64, f64)> = Vec::new();
        for (row, cells) in chart.cells.iter().enumerate() {
            match cells[col] {
                Some(v) => segment.push((frame.x(row), frame.y(v))),
                None if !segment.is_empty() => {
                    out.push_str(&polyline(&segment, color));
                    segment.clear();
                }
                None => {}
            }
        }
        if !segment.is_empty() {
            out.push_str(&polyline(&segment, color));
        }
        out.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" fill="{color}">{}</text>"#,
            PAD_LEFT + 8.0 + col as f64 * 80.0,
            HEIGHT - 8.0,
            escape_xml(ticker)
        ));
    }
    out.push_str("</svg>");
    out
}

/// Horizontal bars, one per ranked security, in ranking order. Values are
/// fractions and labelled as percentages when `as_pct` is set.
pub fn generate_bar_svg(items: &[RankedSecurity], as_pct: bool) -> String {
    if items.is_empty() {
        return String::new();
    }
    let max_abs = items
        .iter()
        .map(|r| r.value.abs())
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);
    let any_negative = items.iter().any(|r| r.value < 0.0);

    let row_h = 20.0;
    let height = PAD_TOP + row_h * items.len() as f64 + 10.0;
    let bar_area = WIDTH - PAD_LEFT - PAD_RIGHT - 60.0;
    let origin = if any_negative {
        PAD_LEFT + bar_area / 2.0
    } else {
        PAD_LEFT
    };
    let half_or_full = if any_negative { bar_area / 2.0 } else { bar_area };
    let scale = half_or_full / max_abs;

    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" font-family="sans-serif" font-size="10"><rect width="{WIDTH}" height="{height}" fill="white"/>"#
    );
    for (i, item) in items.iter().enumerate() {
        let y = PAD_TOP + i as f64 * row_h;
        let w = item.value.abs() * scale;
        let x = if item.value < 0.0 { origin - w } else { origin };
        let color = if item.value < 0.0 { "#d62728" } else { "#2ca02c" };
        let label = if as_pct {
            pct_label(item.value)
        } else {
            format!("{:.4}", item.value)
        };
        out.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            PAD_LEFT - 4.0,
            y + 13.0,
            escape_xml(&item.ticker)
        ));
        out.push_str(&format!(
            r#"<rect x="{x:.1}" y="{:.1}" width="{w:.1}" height="{:.1}" fill="{color}"/>"#,
            y + 3.0,
            row_h - 6.0
        ));
        out.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}">{label}</text>"#,
            origin.max(x + w) + 4.0,
            y + 13.0
        ));
    }
    out.push_str("</svg>");
    out
}
