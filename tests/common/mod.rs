#![allow(dead_code)]

use chrono::NaiveDate;
use stockdash::domain::error::StockdashError;
pub use stockdash::domain::ohlcv::Observation;
use stockdash::domain::series::{SeriesMap, TimeSeries};
use stockdash::ports::table_port::{RawTable, TableSource};

/// In-memory table source. Rows are kept as strings so malformed cells can
/// be fed straight to the loader.
pub struct MockTableSource {
    pub table: RawTable,
    pub error: Option<String>,
}

impl MockTableSource {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            table: RawTable::new(headers.iter().map(|h| h.to_string()).collect()),
            error: None,
        }
    }

    /// Standard `Date,Symbol,Open,High,Low,Close,Volume` layout.
    pub fn ohlcv() -> Self {
        Self::new(&["Date", "Symbol", "Open", "High", "Low", "Close", "Volume"])
    }

    pub fn with_row(mut self, cells: &[&str]) -> Self {
        self.table
            .rows
            .push(cells.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Appends a row in the `ohlcv()` layout with open/high/low derived from close.
    pub fn with_close(self, symbol: &str, date: &str, close: f64) -> Self {
        let (o, h, l) = (close.to_string(), (close + 1.0).to_string(), (close - 1.0).to_string());
        let c = close.to_string();
        self.with_row(&[date, symbol, &o, &h, &l, &c, "1000"])
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl TableSource for MockTableSource {
    fn read_table(&self) -> Result<RawTable, StockdashError> {
        if let Some(reason) = &self.error {
            return Err(StockdashError::Source {
                path: "<mock>".into(),
                reason: reason.clone(),
            });
        }
        Ok(self.table.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_obs(ticker: &str, date: NaiveDate, close: f64) -> Observation {
    Observation {
        ticker: ticker.to_string(),
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
    }
}

/// Consecutive daily closes starting 2024-01-01.
pub fn make_series(ticker: &str, closes: &[f64]) -> TimeSeries {
    let start = date(2024, 1, 1);
    let obs = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_obs(ticker, start + chrono::Duration::days(i as i64), c))
        .collect();
    TimeSeries::new(ticker.to_string(), obs)
}

/// Series from explicit `(day-of-January-2024, close)` points.
pub fn make_dated_series(ticker: &str, points: &[(u32, f64)]) -> TimeSeries {
    let obs = points
        .iter()
        .map(|&(day, c)| make_obs(ticker, date(2024, 1, day), c))
        .collect();
    TimeSeries::new(ticker.to_string(), obs)
}

pub fn map_of(series: Vec<TimeSeries>) -> SeriesMap {
    series.into_iter().map(|s| (s.ticker.clone(), s)).collect()
}

pub const COMBINED_CSV: &str = "Date,Symbol,Open,High,Low,Close,Volume\n\
2024-01-03,AAA,11.0,12.5,10.5,12.0,1500\n\
2024-01-02,AAA,10.0,11.5,9.5,11.0,1200\n\
2024-01-01,AAA,10.0,10.5,9.5,10.0,1000\n\
2024-01-01,BBB,20.0,20.5,19.5,20.0,5000\n\
2024-01-02,BBB,20.0,20.5,18.5,19.0,5200\n\
2024-01-03,BBB,19.0,19.5,17.5,18.0,4800\n\
2024-01-02,CCC,5.0,5.5,4.5,5.0,300\n";
