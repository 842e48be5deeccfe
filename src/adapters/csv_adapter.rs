//! CSV file adapters: table source and exports.

use crate::domain::error::StockdashError;
use crate::domain::series::{SYMBOL_COLUMN, TICKER_COLUMN};
use crate::domain::summary::{SecuritySummary, VolatilityRow};
use crate::ports::export_port::ExportPort;
use crate::ports::table_port::{RawTable, TableSource};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const SUMMARY_FILE: &str = "market_summary.csv";
pub const VOLATILITY_FILE: &str = "top_volatile_stocks.csv";

/// Reads either one combined CSV file or a directory of `<SYMBOL>.csv`
/// files. In directory mode a file without an identifier column takes its
/// identifier from the file stem.
pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_file(path: &Path) -> Result<RawTable, StockdashError> {
        let source_err = |reason: String| StockdashError::Source {
            path: path.display().to_string(),
            reason,
        };
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| source_err(e.to_string()))?;

        let headers = rdr
            .headers()
            .map_err(|e| source_err(format!("CSV header error: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut table = RawTable::new(headers);

        for result in rdr.records() {
            let record = result.map_err(|e| source_err(format!("CSV parse error: {e}")))?;
            table.rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(table)
    }

    fn read_dir(&self) -> Result<RawTable, StockdashError> {
        let entries = fs::read_dir(&self.path).map_err(|e| StockdashError::Source {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                files.push(path);
            } else {
                tracing::warn!(path = %path.display(), "skipping non-CSV entry");
            }
        }
        files.sort();

        let mut combined: Option<RawTable> = None;
        for file in files {
            let mut table = Self::read_file(&file)?;
            if table.column(TICKER_COLUMN).is_none() && table.column(SYMBOL_COLUMN).is_none() {
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                table.headers.push(SYMBOL_COLUMN.to_string());
                for row in &mut table.rows {
                    row.push(stem.clone());
                }
            }
            combined = Some(match combined {
                None => table,
                Some(acc) => append_aligned(acc, table, &file)?,
            });
        }
        Ok(combined.unwrap_or_default())
    }
}

/// Appends `next` to `acc`, reordering its cells to `acc`'s header order.
fn append_aligned(
    mut acc: RawTable,
    next: RawTable,
    file: &Path,
) -> Result<RawTable, StockdashError> {
    let mapping = acc
        .headers
        .iter()
        .map(|h| {
            next.column(h.trim())
                .or_else(|| match h.trim() {
                    TICKER_COLUMN => next.column(SYMBOL_COLUMN),
                    SYMBOL_COLUMN => next.column(TICKER_COLUMN),
                    _ => None,
                })
                .ok_or_else(|| StockdashError::Source {
                    path: file.display().to_string(),
                    reason: format!("column {} not present", h.trim()),
                })
        })
        .collect::<Result<Vec<usize>, _>>()?;

    for row in next.rows {
        acc.rows.push(
            mapping
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or_default())
                .collect(),
        );
    }
    Ok(acc)
}

impl TableSource for CsvAdapter {
    fn read_table(&self) -> Result<RawTable, StockdashError> {
        if self.path.is_dir() {
            self.read_dir()
        } else {
            Self::read_file(&self.path)
        }
    }
}

/// Writes per-security files and the summary/volatility tables into one
/// output directory.
pub struct CsvExporter {
    output_dir: PathBuf,
    summary_file: String,
    volatility_file: String,
}

impl CsvExporter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            summary_file: SUMMARY_FILE.to_string(),
            volatility_file: VOLATILITY_FILE.to_string(),
        }
    }

    pub fn with_summary_file(mut self, name: &str) -> Self {
        self.summary_file = name.to_string();
        self
    }

    pub fn with_volatility_file(mut self, name: &str) -> Self {
        self.volatility_file = name.to_string();
        self
    }

    /// `<output_dir>/<ticker>.csv`. Identifiers that are not a single plain
    /// file name are rejected so nothing is written outside `output_dir`.
    pub fn series_path(&self, ticker: &str) -> Result<PathBuf, StockdashError> {
        let mut components = Path::new(ticker).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) && !ticker.contains(['/', '\\']);
        if !plain {
            return Err(StockdashError::Export {
                path: self.output_dir.display().to_string(),
                reason: format!("identifier {ticker:?} is not a valid file name"),
            });
        }
        Ok(self.output_dir.join(format!("{ticker}.csv")))
    }

    fn writer(&self, path: &Path) -> Result<csv::Writer<fs::File>, StockdashError> {
        fs::create_dir_all(&self.output_dir)?;
        csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| export_err(path, e))
    }

    fn write_rows<T: serde::Serialize>(
        &self,
        name: &str,
        rows: &[T],
    ) -> Result<(), StockdashError> {
        let path = self.output_dir.join(name);
        let mut wtr = self.writer(&path)?;
        for row in rows {
            wtr.serialize(row).map_err(|e| export_err(&path, e))?;
        }
        wtr.flush()?;
        tracing::info!(path = %path.display(), rows = rows.len(), "wrote export");
        Ok(())
    }
}

fn export_err(path: &Path, e: impl std::fmt::Display) -> StockdashError {
    StockdashError::Export {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

impl ExportPort for CsvExporter {
    fn write_security(&self, ticker: &str, table: &RawTable) -> Result<(), StockdashError> {
        let path = self.series_path(ticker)?;
        let mut wtr = self.writer(&path)?;
        wtr.write_record(&table.headers)
            .map_err(|e| export_err(&path, e))?;
        for row in &table.rows {
            wtr.write_record(row).map_err(|e| export_err(&path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_summary(&self, rows: &[SecuritySummary]) -> Result<(), StockdashError> {
        self.write_rows(&self.summary_file, rows)
    }

    fn write_volatility(&self, rows: &[VolatilityRow]) -> Result<(), StockdashError> {
        self.write_rows(&self.volatility_file, rows)
    }
}
