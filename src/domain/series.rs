//! Time series store: normalizes a raw table into per-security series.
//!
//! The identifier column may arrive as `Symbol` or `Ticker`; it is always
//! exposed as the ticker. Rows are grouped by ticker and each group is
//! stable-sorted by date, so duplicate dates keep their input order.

use crate::domain::error::StockdashError;
use crate::domain::ohlcv::Observation;
use crate::ports::table_port::{RawTable, TableSource};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};

pub const TICKER_COLUMN: &str = "Ticker";
pub const SYMBOL_COLUMN: &str = "Symbol";
pub const DATE_COLUMN: &str = "Date";
pub const OPEN_COLUMN: &str = "Open";
pub const HIGH_COLUMN: &str = "High";
pub const LOW_COLUMN: &str = "Low";
pub const CLOSE_COLUMN: &str = "Close";
pub const VOLUME_COLUMN: &str = "Volume";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Observations of one security, ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub ticker: String,
    pub observations: Vec<Observation>,
}

impl TimeSeries {
    /// Builds a series, stable-sorting the observations by date.
    pub fn new(ticker: String, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self {
            ticker,
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    /// First observation on `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&Observation> {
        let idx = self.observations.partition_point(|o| o.date < date);
        self.observations.get(idx).filter(|o| o.date == date)
    }

    /// The most recent `k` observations, oldest first.
    pub fn recent(&self, k: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(k);
        &self.observations[start..]
    }
}

pub type SeriesMap = BTreeMap<String, TimeSeries>;

/// Reads the source table and normalizes it.
pub fn load(source: &dyn TableSource) -> Result<SeriesMap, StockdashError> {
    let table = source.read_table()?;
    let map = from_table(&table)?;
    tracing::info!(
        rows = table.row_count(),
        securities = map.len(),
        "loaded time series"
    );
    Ok(map)
}

struct Columns {
    ticker: usize,
    /// Header the identifier was found under.
    ticker_name: &'static str,
    date: usize,
    close: usize,
    volume: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
}

impl Columns {
    fn resolve(table: &RawTable) -> Result<Self, StockdashError> {
        let required = |name: &str| {
            table.column(name).ok_or_else(|| StockdashError::MissingColumn {
                column: name.to_string(),
            })
        };
        let (ticker, ticker_name) = match table.column(TICKER_COLUMN) {
            Some(idx) => (idx, TICKER_COLUMN),
            None => table
                .column(SYMBOL_COLUMN)
                .map(|idx| (idx, SYMBOL_COLUMN))
                .ok_or_else(|| StockdashError::MissingColumn {
                    column: format!("{TICKER_COLUMN} or {SYMBOL_COLUMN}"),
                })?,
        };
        Ok(Self {
            ticker,
            ticker_name,
            date: required(DATE_COLUMN)?,
            close: required(CLOSE_COLUMN)?,
            volume: required(VOLUME_COLUMN)?,
            open: table.column(OPEN_COLUMN),
            high: table.column(HIGH_COLUMN),
            low: table.column(LOW_COLUMN),
        })
    }
}

/// Pure normalization of a raw table. Any unparseable row fails the whole load.
pub fn from_table(table: &RawTable) -> Result<SeriesMap, StockdashError> {
    let cols = Columns::resolve(table)?;
    let mut groups: BTreeMap<String, Vec<Observation>> = BTreeMap::new();

    for (i, record) in table.rows.iter().enumerate() {
        let row = i + 1;
        let cell = |idx: usize, name: &str| -> Result<&str, StockdashError> {
            record
                .get(idx)
                .map(|s| s.trim())
                .ok_or_else(|| StockdashError::MalformedInput {
                    row,
                    column: name.to_string(),
                    reason: "missing cell".into(),
                })
        };

        let ticker = cell(cols.ticker, cols.ticker_name)?;
        if ticker.is_empty() {
            return Err(StockdashError::MalformedInput {
                row,
                column: cols.ticker_name.into(),
                reason: "empty identifier".into(),
            });
        }

        let date_str = cell(cols.date, DATE_COLUMN)?;
        let date = parse_date(date_str).ok_or_else(|| StockdashError::MalformedInput {
            row,
            column: DATE_COLUMN.into(),
            reason: format!("unparseable date: {date_str:?}"),
        })?;

        let close = parse_number(cell(cols.close, CLOSE_COLUMN)?, row, CLOSE_COLUMN)?;
        let volume = parse_number(cell(cols.volume, VOLUME_COLUMN)?, row, VOLUME_COLUMN)?;
        if volume < 0.0 {
            return Err(StockdashError::MalformedInput {
                row,
                column: VOLUME_COLUMN.into(),
                reason: format!("negative volume: {volume}"),
            });
        }

        let optional = |idx: Option<usize>, name: &str| -> Result<f64, StockdashError> {
            match idx {
                Some(idx) => parse_number(cell(idx, name)?, row, name),
                None => Ok(close),
            }
        };

        let obs = Observation {
            ticker: ticker.to_string(),
            date,
            open: optional(cols.open, OPEN_COLUMN)?,
            high: optional(cols.high, HIGH_COLUMN)?,
            low: optional(cols.low, LOW_COLUMN)?,
            close,
            volume,
        };
        groups.entry(obs.ticker.clone()).or_default().push(obs);
    }

    Ok(groups
        .into_iter()
        .map(|(ticker, obs)| (ticker.clone(), TimeSeries::new(ticker, obs)))
        .collect())
}

/// Splits the raw table into one table per identifier, keeping the source
/// headers and cells untouched. Each group is stable-sorted by date.
pub fn partition(table: &RawTable) -> Result<BTreeMap<String, RawTable>, StockdashError> {
    let cols = Columns::resolve(table)?;
    let mut groups: BTreeMap<String, Vec<(NaiveDate, &Vec<String>)>> = BTreeMap::new();

    for (i, record) in table.rows.iter().enumerate() {
        let row = i + 1;
        let malformed = |column: &str, reason: String| StockdashError::MalformedInput {
            row,
            column: column.to_string(),
            reason,
        };
        let ticker = record
            .get(cols.ticker)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed(cols.ticker_name, "empty identifier".into()))?;
        let date_str = record
            .get(cols.date)
            .ok_or_else(|| malformed(DATE_COLUMN, "missing cell".into()))?;
        let date = parse_date(date_str)
            .ok_or_else(|| malformed(DATE_COLUMN, format!("unparseable date: {date_str:?}")))?;
        groups
            .entry(ticker.to_string())
            .or_default()
            .push((date, record));
    }

    Ok(groups
        .into_iter()
        .map(|(ticker, mut rows)| {
            rows.sort_by_key(|(date, _)| *date);
            let part = RawTable {
                headers: table.headers.clone(),
                rows: rows.into_iter().map(|(_, r)| r.clone()).collect(),
            };
            (ticker, part)
        })
        .collect())
}

/// Parses a calendar date, discarding any time-of-day component.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn parse_number(s: &str, row: usize, column: &str) -> Result<f64, StockdashError> {
    let malformed = |reason: String| StockdashError::MalformedInput {
        row,
        column: column.to_string(),
        reason,
    };
    let value: f64 = s
        .parse()
        .map_err(|_| malformed(format!("not a number: {s:?}")))?;
    if !value.is_finite() {
        return Err(malformed(format!("not a finite number: {s:?}")));
    }
    Ok(value)
}

/// Distinct identifiers, ascending.
pub fn identifiers(map: &SeriesMap) -> Vec<String> {
    map.keys().cloned().collect()
}

/// Sorted union of every date present in any series.
pub fn unified_timeline(map: &SeriesMap) -> Vec<NaiveDate> {
    let unique: BTreeSet<NaiveDate> = map
        .values()
        .flat_map(|s| s.observations.iter().map(|o| o.date))
        .collect();
    unique.into_iter().collect()
}
