//! Table formatting for the dashboard report.
//!
//! Provides functions to generate Typst markup for:
//! - Market overview metric cards
//! - Recent-data table of the selected security
//! - Ranking tables (gainers, losers, volatility)
//! - Correlation heatmap grid

use crate::domain::correlation::CorrelationMatrix;
use crate::domain::dashboard::SecurityView;
use crate::domain::ranking::RankedSecurity;
use crate::domain::summary::MarketOverview;

/// Escapes Typst markup characters inside `[...]` content.
pub fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(
            c,
            '\\' | '#' | '*' | '_' | '$' | '@' | '<' | '>' | '[' | ']' | '`' | '~'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn format_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "n/a".to_string(),
    }
}

/// Integer with thousands separators, e.g. 1234567 -> "1,234,567".
pub fn format_thousands(value: f64) -> String {
    let n = value.trunc() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 { format!("-{grouped}") } else { grouped }
}

pub fn render_overview(overview: &MarketOverview) -> String {
    let mut out = String::from("#table(\n  columns: 4,\n  stroke: none,\n");
    out.push_str("  [*Green Stocks*], [*Red Stocks*], [*Avg Price*], [*Avg Volume*],\n");
    out.push_str(&format!(
        "  text(fill: green, [{}]), text(fill: red, [{}]), [{}], [{}],\n",
        overview.counts.green,
        overview.counts.red,
        format_opt(overview.average_price, 2),
        overview
            .average_volume
            .map(format_thousands)
            .unwrap_or_else(|| "n/a".to_string()),
    ));
    out.push_str(")\n");
    out.push_str(&format!(
        "\n_{} securities, {} observations._\n",
        overview.securities, overview.observations
    ));
    out
}

pub fn render_security_table(view: &SecurityView) -> String {
    if view.recent.is_empty() {
        return "_No data for the selected security._\n".to_string();
    }

    let mut out = String::from(
        "#table(\n  columns: 7,\n  align: (left, right, right, right, right, right, right),\n",
    );
    out.push_str(
        "  [*Date*], [*Open*], [*High*], [*Low*], [*Close*], [*Volume*], [*Change*],\n",
    );
    for o in &view.recent {
        let change = match o.intraday_change() {
            Some(c) => {
                let color = if c >= 0.0 { "green" } else { "red" };
                format!("text(fill: {color}, [{:+.2}%])", c * 100.0)
            }
            None => "[n/a]".to_string(),
        };
        out.push_str(&format!(
            "  [{}], [{:.2}], [{:.2}], [{:.2}], [{:.2}], [{}], {},\n",
            o.date.format("%Y-%m-%d"),
            o.open,
            o.high,
            o.low,
            o.close,
            format_thousands(o.volume),
            change
        ));
    }
    out.push_str(")\n");
    out
}

pub fn render_ranking_table(items: &[RankedSecurity], header: &str, as_pct: bool) -> String {
    if items.is_empty() {
        return "_No qualifying securities._\n".to_string();
    }
    let mut out = String::from("#table(\n  columns: 3,\n  align: (right, left, right),\n");
    out.push_str(&format!("  [*\\#*], [*Symbol*], [*{}*],\n", header));
    for (i, item) in items.iter().enumerate() {
        let value = if as_pct {
            format!("{:+.2}%", item.value * 100.0)
        } else {
            format!("{:.4}", item.value)
        };
        out.push_str(&format!(
            "  [{}], [{}], [{}],\n",
            i + 1,
            escape_typst(&item.ticker),
            value
        ));
    }
    out.push_str(")\n");
    out
}

/// Fill colour on a blue (-1) / white (0) / red (+1) scale.
fn correlation_color(r: f64) -> (&'static str, bool) {
    if r >= 0.75 {
        ("rgb(\"#B40426\")", true)
    } else if r >= 0.4 {
        ("rgb(\"#E7745B\")", false)
    } else if r > 0.1 {
        ("rgb(\"#F5C4AC\")", false)
    } else if r >= -0.1 {
        ("rgb(\"#DDDDDD\")", false)
    } else if r > -0.4 {
        ("rgb(\"#AAC7FD\")", false)
    } else if r > -0.75 {
        ("rgb(\"#6F92F3\")", false)
    } else {
        ("rgb(\"#3B4CC0\")", true)
    }
}

fn format_heatmap_cell(r: Option<f64>) -> String {
    match r {
        Some(r) => {
            let (color, white_text) = correlation_color(r);
            if white_text {
                format!("table.cell(fill: {color}, text(fill: white, [{r:.2}]))")
            } else {
                format!("table.cell(fill: {color}, [{r:.2}])")
            }
        }
        None => "table.cell(fill: white, text(fill: gray, [n/a]))".to_string(),
    }
}

pub fn render_correlation_heatmap(matrix: &CorrelationMatrix) -> String {
    if matrix.is_empty() {
        return "_No correlation data._\n".to_string();
    }

    let n = matrix.len();
    let mut out = format!("#table(\n  columns: {},\n  align: center,\n  [],", n + 1);
    for ticker in &matrix.tickers {
        out.push_str(&format!(" [*{}*],", escape_typst(ticker)));
    }
    out.push('\n');

    for (i, ticker) in matrix.tickers.iter().enumerate() {
        out.push_str(&format!("  [*{}*],", escape_typst(ticker)));
        for j in 0..n {
            out.push_str(&format!(" {},", format_heatmap_cell(matrix.cells[i][j])));
        }
        out.push('\n');
    }
    out.push_str(")\n");
    out
}

pub fn render_security_list(securities: &[String], selected: Option<&str>) -> String {
    if securities.is_empty() {
        return "_No securities loaded._\n".to_string();
    }
    let items: Vec<String> = securities
        .iter()
        .map(|s| {
            let name = escape_typst(s);
            if Some(s.as_str()) == selected {
                format!("*{name}*")
            } else {
                name
            }
        })
        .collect();
    format!("{}\n", items.join(", "))
}
