//! Daily OHLCV observation.

use chrono::NaiveDate;

/// One row of the time series. Only `close` and `volume` feed the
/// statistics; the other prices are carried through to exports and the
/// detail table.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Observation {
    /// (close - open) / open, `None` when the open is zero.
    pub fn intraday_change(&self) -> Option<f64> {
        if self.open == 0.0 {
            None
        } else {
            Some((self.close - self.open) / self.open)
        }
    }
}
