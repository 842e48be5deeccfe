//! Correlation engine.
//!
//! Close prices are outer-joined on date into a [`PriceTable`]; each pair of
//! securities is then correlated over the dates where both have a price.
//! Undefined coefficients (fewer than two shared dates, or a constant side)
//! are `None`, never 0.0.

use crate::domain::series::{SeriesMap, unified_timeline};
use chrono::NaiveDate;

/// Date-indexed, security-columned close prices. `cells[d][s]` is the close
/// of `tickers[s]` on `dates[d]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub dates: Vec<NaiveDate>,
    pub tickers: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn build(map: &SeriesMap) -> Self {
        let dates = unified_timeline(map);
        let tickers: Vec<String> = map.keys().cloned().collect();
        let cells = dates
            .iter()
            .map(|&date| {
                map.values()
                    .map(|series| series.get(date).map(|o| o.close))
                    .collect()
            })
            .collect();
        Self {
            dates,
            tickers,
            cells,
        }
    }

    /// Values of two columns on the dates where both are present.
    pub fn pairwise_complete(&self, a: usize, b: usize) -> (Vec<f64>, Vec<f64>) {
        self.cells
            .iter()
            .filter_map(|row| Some((row[a]?, row[b]?)))
            .unzip()
    }
}

/// Pearson correlation coefficient, clamped to [-1, 1].
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.cells[i][j]
    }
}

pub fn correlation_matrix(map: &SeriesMap) -> CorrelationMatrix {
    let table = PriceTable::build(map);
    let n = table.tickers.len();
    let mut cells = vec![vec![None; n]; n];

    for (i, series) in map.values().enumerate() {
        if !series.is_empty() {
            cells[i][i] = Some(1.0);
        }
        for j in (i + 1)..n {
            let (x, y) = table.pairwise_complete(i, j);
            let r = pearson(&x, &y);
            if r.is_none() {
                tracing::debug!(
                    a = %table.tickers[i],
                    b = %table.tickers[j],
                    shared = x.len(),
                    "undefined correlation"
                );
            }
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }

    CorrelationMatrix {
        tickers: table.tickers,
        cells,
    }
}
