//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvAdapter, CsvExporter, SUMMARY_FILE, VOLATILITY_FILE};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::dashboard::{
    DEFAULT_CUMULATIVE_TOP, DEFAULT_RECENT_ROWS, Dashboard, DashboardSettings,
};
use crate::domain::error::StockdashError;
use crate::domain::ranking::DEFAULT_TOP_N;
use crate::domain::series::{self, SeriesMap};
use crate::domain::summary;
use crate::ports::config_port::ConfigPort;
use crate::ports::export_port::ExportPort;
use crate::ports::report_port::ReportPort;
use crate::ports::table_port::TableSource;

pub const DEFAULT_INPUT: &str = "data/csv/all_stocks.csv";
pub const DEFAULT_EXPORT_DIR: &str = "data/csv";
pub const DEFAULT_SPLIT_DIR: &str = "data/csv/stocks";
pub const DEFAULT_REPORT_FILE: &str = "report.typ";

#[derive(Parser, Debug)]
#[command(name = "stockdash", about = "Stock performance dashboard and market analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the dashboard as a Typst document
    Dashboard {
        /// Combined CSV file or directory of per-security files
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Security to show in the detail panels
        #[arg(short, long)]
        select: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        top: Option<u64>,
    },
    /// Write one CSV file per security
    Split {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the per-security return/price/volume summary
    Summary {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the most volatile securities
    Volatility {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        top: Option<u64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the distinct security identifiers
    Symbols {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the most recent rows of one security
    Show {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        ticker: String,
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        rows: Option<u64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Installs the stderr `tracing` subscriber. `RUST_LOG` overrides the
/// default `warn` level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Dashboard {
            input,
            config,
            select,
            output,
            top,
        } => run_dashboard(
            input.as_ref(),
            config.as_ref(),
            select.as_deref(),
            output.as_ref(),
            top,
        ),
        Command::Split {
            input,
            output_dir,
            config,
        } => run_split(input.as_ref(), output_dir.as_ref(), config.as_ref()),
        Command::Summary {
            input,
            output,
            config,
        } => run_summary(input.as_ref(), output.as_ref(), config.as_ref()),
        Command::Volatility {
            input,
            top,
            output,
            config,
        } => run_volatility(input.as_ref(), top, output.as_ref(), config.as_ref()),
        Command::Symbols { input, config } => run_symbols(input.as_ref(), config.as_ref()),
        Command::Show {
            input,
            ticker,
            rows,
            config,
        } => run_show(input.as_ref(), &ticker, rows, config.as_ref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Loads the INI file at `path`, or an empty configuration when no file was
/// given so every lookup falls through to its default.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, StockdashError> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p)
        }
        None => FileConfigAdapter::from_string(""),
    }
}

/// `--input` wins over `[data] path`, which wins over the built-in default.
pub fn resolve_input(input: Option<&PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    input
        .cloned()
        .or_else(|| config.get_string("data", "path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT))
}

fn export_dir(config: &dyn ConfigPort) -> PathBuf {
    config
        .get_string("export", "output_dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR))
}

fn positive_setting(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, StockdashError> {
    if !config.has_key(section, key) {
        return Ok(default);
    }
    let value = config.get_int(section, key, -1);
    if value <= 0 {
        return Err(StockdashError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: "must be a positive integer".into(),
        });
    }
    Ok(value as usize)
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<DashboardSettings, StockdashError> {
    Ok(DashboardSettings {
        top_n: positive_setting(config, "dashboard", "top_n", DEFAULT_TOP_N)?,
        recent_rows: positive_setting(config, "dashboard", "recent_rows", DEFAULT_RECENT_ROWS)?,
        cumulative_top: positive_setting(
            config,
            "dashboard",
            "cumulative_top",
            DEFAULT_CUMULATIVE_TOP,
        )?,
    })
}

pub fn load_series(path: &Path) -> Result<SeriesMap, StockdashError> {
    eprintln!("Loading data from {}", path.display());
    let map = series::load(&CsvAdapter::new(path.to_path_buf()))?;
    eprintln!("  {} securities loaded", map.len());
    Ok(map)
}

/// Exporter writing into the parent directory of `output` under its file name.
fn exporter_for(output: &Path) -> (CsvExporter, String) {
    let dir = output.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (CsvExporter::new(dir), name)
}

fn run_dashboard(
    input: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
    select: Option<&str>,
    output: Option<&PathBuf>,
    top: Option<u64>,
) -> Result<(), StockdashError> {
    let config = load_config(config_path)?;
    let mut settings = build_settings(&config)?;
    if let Some(n) = top {
        settings.top_n = n as usize;
    }

    let data = load_series(&resolve_input(input, &config))?;
    let dashboard = Dashboard::new(data, settings);
    let snapshot = dashboard.snapshot(select)?;

    let mut report = TypstReportAdapter::new();
    if let Some(title) = config.get_string("report", "title") {
        report = report.with_title(&title);
    }
    if let Some(template) = config.get_string("report", "template_path") {
        report = report.with_template(PathBuf::from(template));
    }

    let counts = snapshot.rankings.counts;
    eprintln!("\n=== Market Overview ===");
    eprintln!("Green Stocks:     {}", counts.green);
    eprintln!("Red Stocks:       {}", counts.red);
    if !snapshot.rankings.excluded.is_empty() {
        eprintln!(
            "Excluded:         {} (fewer than 2 observations)",
            snapshot.rankings.excluded.join(", ")
        );
    }

    let output = output
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE));
    report.write(&snapshot, &output.to_string_lossy())?;
    eprintln!("\nReport written to: {}", output.display());
    Ok(())
}

fn run_split(
    input: Option<&PathBuf>,
    output_dir: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
) -> Result<(), StockdashError> {
    let config = load_config(config_path)?;
    let path = resolve_input(input, &config);
    eprintln!("Loading data from {}", path.display());
    let table = CsvAdapter::new(path).read_table()?;
    // Validate every row before writing anything.
    series::from_table(&table)?;
    let parts = series::partition(&table)?;
    let dir = output_dir
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SPLIT_DIR));

    let exporter = CsvExporter::new(dir.clone());
    for (ticker, part) in &parts {
        exporter.write_security(ticker, part)?;
    }
    eprintln!("Created {} stock CSV files in {}", parts.len(), dir.display());
    Ok(())
}

fn run_summary(
    input: Option<&PathBuf>,
    output: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
) -> Result<(), StockdashError> {
    let config = load_config(config_path)?;
    let data = load_series(&resolve_input(input, &config))?;
    let output = output
        .cloned()
        .unwrap_or_else(|| export_dir(&config).join(SUMMARY_FILE));

    let rows = summary::summarize(&data);
    let (exporter, name) = exporter_for(&output);
    exporter.with_summary_file(&name).write_summary(&rows)?;
    eprintln!("Market summary written to: {}", output.display());
    Ok(())
}

fn run_volatility(
    input: Option<&PathBuf>,
    top: Option<u64>,
    output: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
) -> Result<(), StockdashError> {
    let config = load_config(config_path)?;
    let top_n = match top {
        Some(n) => n as usize,
        None => build_settings(&config)?.top_n,
    };
    let data = load_series(&resolve_input(input, &config))?;
    let output = output
        .cloned()
        .unwrap_or_else(|| export_dir(&config).join(VOLATILITY_FILE));

    let rows = summary::volatility_rows(&data, top_n);
    let (exporter, name) = exporter_for(&output);
    exporter.with_volatility_file(&name).write_volatility(&rows)?;
    for row in &rows {
        println!("{:<10} {:.6}", row.symbol, row.volatility);
    }
    eprintln!("Volatility analysis written to: {}", output.display());
    Ok(())
}

fn run_symbols(
    input: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
) -> Result<(), StockdashError> {
    let config = load_config(config_path)?;
    let data = load_series(&resolve_input(input, &config))?;
    let symbols = series::identifiers(&data);
    if symbols.is_empty() {
        eprintln!("No symbols found");
        return Ok(());
    }
    for symbol in &symbols {
        println!("{symbol}");
    }
    eprintln!("{} symbols found", symbols.len());
    Ok(())
}

fn run_show(
    input: Option<&PathBuf>,
    ticker: &str,
    rows: Option<u64>,
    config_path: Option<&PathBuf>,
) -> Result<(), StockdashError> {
    let config = load_config(config_path)?;
    let mut settings = build_settings(&config)?;
    if let Some(k) = rows {
        settings.recent_rows = k as usize;
    }
    let data = load_series(&resolve_input(input, &config))?;
    let view = Dashboard::new(data, settings).selection(ticker)?;

    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>14}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    for o in &view.recent {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14.0}",
            o.date.format("%Y-%m-%d"),
            o.open,
            o.high,
            o.low,
            o.close,
            o.volume
        );
    }
    Ok(())
}
