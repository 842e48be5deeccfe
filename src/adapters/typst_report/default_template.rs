//! Default Typst dashboard template.
//!
//! Built-in Typst markup with `{{PLACEHOLDER}}` substitution.

const TEMPLATE: &str = r#"#set page(paper: "a4", margin: 1.5cm, flipped: true)
#set text(size: 9pt)

= {{TITLE}}

== Market Overview

{{MARKET_OVERVIEW}}

== Securities

{{SECURITY_LIST}}

== {{SELECTED}} -- Recent Data

{{SECURITY_TABLE}}

=== Closing Price Over Time

{{PRICE_CHART_SVG}}

== Top Gainers & Losers

#grid(
  columns: (1fr, 1fr),
  gutter: 12pt,
  [
    === Top Gainers
    {{GAINERS_CHART_SVG}}
  ],
  [
    === Top Losers
    {{LOSERS_CHART_SVG}}
  ],
)

== Most Volatile Securities

{{VOLATILITY_CHART_SVG}}

=== Rankings

{{RANKING_TABLES}}

== Cumulative Return (Leaders)

{{CUMULATIVE_CHART_SVG}}

== Price Correlation

{{CORRELATION_HEATMAP}}
"#;

pub fn template() -> &'static str {
    TEMPLATE
}
