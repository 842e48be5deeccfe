//! Return engine: period, daily and cumulative returns of a series.
//!
//! Daily returns use the n-1 form: one point per observation after the
//! first, dated at the later observation. A zero prior close makes that
//! single point absent rather than failing the sequence.
//!
//! Cumulative returns compound absent daily returns as 0.0 so that one gap
//! does not blank out the rest of the curve. This keeps charts continuous;
//! it is a presentation choice and `daily_returns` still reports the gap.

use crate::domain::error::StockdashError;
use crate::domain::ohlcv::Observation;
use crate::domain::series::TimeSeries;
use chrono::NaiveDate;

/// Observations needed for any return-based statistic.
pub const MIN_OBSERVATIONS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Per-security derived record.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnRecord {
    pub ticker: String,
    pub period_return: Option<f64>,
    pub mean_close: Option<f64>,
    pub mean_volume: Option<f64>,
}

/// (curr.close - prev.close) / prev.close
pub fn simple_return(prev: &Observation, curr: &Observation) -> Result<f64, StockdashError> {
    if prev.close == 0.0 {
        return Err(StockdashError::UndefinedReturn {
            ticker: curr.ticker.clone(),
            date: curr.date,
        });
    }
    Ok((curr.close - prev.close) / prev.close)
}

/// (last close - first close) / first close, taken by date order.
pub fn period_return(series: &TimeSeries) -> Result<f64, StockdashError> {
    if series.len() < MIN_OBSERVATIONS {
        return Err(StockdashError::InsufficientData {
            ticker: series.ticker.clone(),
            observations: series.len(),
            minimum: MIN_OBSERVATIONS,
        });
    }
    // Earliest and latest by date; ties keep the first/last in input order.
    let obs = &series.observations;
    let mut first = &obs[0];
    let mut last = &obs[0];
    for o in obs.iter().skip(1) {
        if o.date < first.date {
            first = o;
        }
        if o.date >= last.date {
            last = o;
        }
    }
    simple_return(first, last)
}

pub fn daily_returns(series: &TimeSeries) -> Vec<ReturnPoint> {
    series
        .observations
        .windows(2)
        .map(|w| {
            let value = match simple_return(&w[0], &w[1]) {
                Ok(r) => Some(r),
                Err(e) => {
                    tracing::debug!("{e}");
                    None
                }
            };
            ReturnPoint {
                date: w[1].date,
                value,
            }
        })
        .collect()
}

/// Running product of (1 + r) - 1, seeded at 0.0 on the first date.
pub fn cumulative_returns(series: &TimeSeries) -> Vec<CumulativePoint> {
    let Some(first) = series.first() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(series.len());
    out.push(CumulativePoint {
        date: first.date,
        value: 0.0,
    });

    let mut growth = 1.0_f64;
    for point in daily_returns(series) {
        growth *= 1.0 + point.value.unwrap_or(0.0);
        out.push(CumulativePoint {
            date: point.date,
            value: growth - 1.0,
        });
    }
    out
}

pub fn mean_close(series: &TimeSeries) -> Option<f64> {
    mean(series.observations.iter().map(|o| o.close))
}

pub fn mean_volume(series: &TimeSeries) -> Option<f64> {
    mean(series.observations.iter().map(|o| o.volume))
}

pub fn summarize(series: &TimeSeries) -> ReturnRecord {
    ReturnRecord {
        ticker: series.ticker.clone(),
        period_return: period_return(series).ok(),
        mean_close: mean_close(series),
        mean_volume: mean_volume(series),
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}
