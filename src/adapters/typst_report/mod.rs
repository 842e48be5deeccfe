//! Typst dashboard report generation.
//!
//! Orchestrates placeholder resolution: reads a Typst template (either the
//! built-in default or a custom file via `template_path`), resolves all
//! `{{PLACEHOLDER}}` markers by calling helpers from `chart_svg` and `tables`,
//! and writes the final `.typ` file.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::PathBuf;

use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::error::StockdashError;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_TITLE: &str = "Stock Performance Dashboard";

/// Context for resolving template placeholders.
pub struct ReportContext<'a> {
    pub title: &'a str,
    pub snapshot: &'a DashboardSnapshot,
}

fn embed_svg(svg: &str, empty_note: &str) -> String {
    if svg.is_empty() {
        format!("_{empty_note}_")
    } else {
        format!(
            "#image.decode(\n\"{}\",\n  width: 100%,\n)",
            svg.replace('\\', "\\\\").replace('"', "\\\"")
        )
    }
}

/// Resolve all `{{PLACEHOLDER}}`s in the given template string and return
/// the final Typst markup ready to be written to a `.typ` file.
pub fn resolve(template: &str, ctx: &ReportContext) -> String {
    let snap = ctx.snapshot;
    let mut output = template.to_string();

    output = output.replace("{{TITLE}}", &tables::escape_typst(ctx.title));
    output = output.replace("{{MARKET_OVERVIEW}}", &tables::render_overview(&snap.overview));

    let selected = snap.selection.as_ref().map(|v| v.ticker.as_str());
    output = output.replace(
        "{{SECURITY_LIST}}",
        &tables::render_security_list(&snap.securities, selected),
    );
    output = output.replace(
        "{{SELECTED}}",
        &tables::escape_typst(selected.unwrap_or("No Selection")),
    );

    // Selected security detail
    let (table, price) = match &snap.selection {
        Some(view) => (
            tables::render_security_table(view),
            embed_svg(
                &chart_svg::generate_price_svg(&view.close_series),
                "No price data.",
            ),
        ),
        None => (
            "_No security selected._".to_string(),
            "_No price data._".to_string(),
        ),
    };
    output = output.replace("{{SECURITY_TABLE}}", &table);
    output = output.replace("{{PRICE_CHART_SVG}}", &price);

    // Rankings
    let rankings = &snap.rankings;
    output = output.replace(
        "{{GAINERS_CHART_SVG}}",
        &embed_svg(
            &chart_svg::generate_bar_svg(&rankings.gainers, true),
            "No qualifying securities.",
        ),
    );
    output = output.replace(
        "{{LOSERS_CHART_SVG}}",
        &embed_svg(
            &chart_svg::generate_bar_svg(&rankings.losers, true),
            "No qualifying securities.",
        ),
    );
    output = output.replace(
        "{{VOLATILITY_CHART_SVG}}",
        &embed_svg(
            &chart_svg::generate_bar_svg(&rankings.volatility, false),
            "No volatility data.",
        ),
    );
    output = output.replace(
        "{{RANKING_TABLES}}",
        &format!(
            "{}\n{}\n{}",
            tables::render_ranking_table(&rankings.gainers, "Return", true),
            tables::render_ranking_table(&rankings.losers, "Return", true),
            tables::render_ranking_table(&rankings.volatility, "Volatility", false),
        ),
    );

    output = output.replace(
        "{{CUMULATIVE_CHART_SVG}}",
        &embed_svg(
            &chart_svg::generate_cumulative_svg(&snap.cumulative),
            "Insufficient data for cumulative returns.",
        ),
    );
    output = output.replace(
        "{{CORRELATION_HEATMAP}}",
        &tables::render_correlation_heatmap(&snap.correlation),
    );

    output
}

/// Writes the dashboard as a `.typ` document.
pub struct TypstReportAdapter {
    title: String,
    template_path: Option<PathBuf>,
}

impl TypstReportAdapter {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            template_path: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_template(mut self, path: PathBuf) -> Self {
        self.template_path = Some(path);
        self
    }

    pub fn render(&self, snapshot: &DashboardSnapshot) -> Result<String, StockdashError> {
        let custom: String;
        let template = match &self.template_path {
            Some(path) => {
                custom = fs::read_to_string(path).map_err(|e| StockdashError::Source {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                custom.as_str()
            }
            None => default_template::template(),
        };
        let ctx = ReportContext {
            title: &self.title,
            snapshot,
        };
        Ok(resolve(template, &ctx))
    }
}

impl Default for TypstReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(
        &self,
        snapshot: &DashboardSnapshot,
        output_path: &str,
    ) -> Result<(), StockdashError> {
        let content = self.render(snapshot)?;
        fs::write(output_path, content).map_err(|e| StockdashError::Export {
            path: output_path.to_string(),
            reason: e.to_string(),
        })?;
        tracing::info!(path = output_path, "wrote dashboard report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::{Dashboard, DashboardSettings};
    use crate::domain::ohlcv::Observation;
    use crate::domain::series::{SeriesMap, TimeSeries};
    use chrono::NaiveDate;

    fn make_series(ticker: &str, closes: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let obs = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Observation {
                ticker: ticker.into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect();
        TimeSeries::new(ticker.into(), obs)
    }

    fn sample_snapshot() -> DashboardSnapshot {
        let map: SeriesMap = [
            make_series("AAA", &[10.0, 11.0, 12.5, 12.0]),
            make_series("BBB", &[20.0, 19.0, 18.5, 18.0]),
            make_series("CCC", &[5.0]),
        ]
        .into_iter()
        .map(|s| (s.ticker.clone(), s))
        .collect();
        Dashboard::new(map, DashboardSettings::default())
            .snapshot(None)
            .unwrap()
    }

    fn empty_snapshot() -> DashboardSnapshot {
        Dashboard::new(SeriesMap::new(), DashboardSettings::default())
            .snapshot(None)
            .unwrap()
    }

    #[test]
    fn resolve_default_template_no_placeholders_remain() {
        let snap = sample_snapshot();
        let ctx = ReportContext {
            title: DEFAULT_TITLE,
            snapshot: &snap,
        };
        let output = resolve(default_template::template(), &ctx);
        assert!(
            !output.contains("{{"),
            "unresolved placeholder in output: {output}"
        );
    }

    #[test]
    fn resolve_produces_valid_typst() {
        let snap = sample_snapshot();
        let ctx = ReportContext {
            title: DEFAULT_TITLE,
            snapshot: &snap,
        };
        let output = resolve(default_template::template(), &ctx);
        assert!(output.contains("#set page("));
        assert!(output.contains("= Stock Performance Dashboard"));
        assert!(output.contains("== AAA -- Recent Data"));
        assert!(output.contains("#image.decode("));
        assert!(output.contains("#table("));
        assert!(output.contains("=== Rankings"));
        assert!(output.contains("[*Volatility*]"));
    }

    #[test]
    fn resolve_empty_dataset() {
        let snap = empty_snapshot();
        let ctx = ReportContext {
            title: "Empty",
            snapshot: &snap,
        };
        let output = resolve(default_template::template(), &ctx);
        assert!(!output.contains("{{"));
        assert!(output.contains("_No security selected._"));
        assert!(output.contains("_No correlation data._"));
        assert!(!output.contains("#image.decode("));
    }

    #[test]
    fn resolve_custom_template() {
        let snap = sample_snapshot();
        let ctx = ReportContext {
            title: "Mine",
            snapshot: &snap,
        };
        let custom = "= {{TITLE}}\n{{RANKING_TABLES}}\n{{CORRELATION_HEATMAP}}";
        let output = resolve(custom, &ctx);
        assert!(output.starts_with("= Mine"));
        assert!(output.contains("[*Volatility*]"));
        assert!(!output.contains("{{"));
    }

    #[test]
    fn adapter_writes_file_with_custom_template() {
        let dir = tempfile::TempDir::new().unwrap();
        let template = dir.path().join("custom.typ");
        fs::write(&template, "= {{TITLE}}\n{{SECURITY_LIST}}").unwrap();
        let out = dir.path().join("dash.typ");

        TypstReportAdapter::new()
            .with_title("Custom")
            .with_template(template)
            .write(&sample_snapshot(), out.to_str().unwrap())
            .unwrap();

        let text = fs::read_to_string(out).unwrap();
        assert_eq!(text, "= Custom\n*AAA*, BBB, CCC\n");
    }

    #[test]
    fn adapter_missing_template_is_error() {
        let adapter = TypstReportAdapter::new().with_template(PathBuf::from("/nonexistent.typ"));
        assert!(matches!(
            adapter.render(&sample_snapshot()),
            Err(StockdashError::Source { .. })
        ));
    }
}
