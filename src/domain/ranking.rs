//! Ranking engine: gainers, losers, volatility and green/red counts.

use crate::domain::returns::{self, MIN_OBSERVATIONS};
use crate::domain::series::{SeriesMap, TimeSeries};
use std::cmp::Ordering;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingConfig {
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSecurity {
    pub ticker: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GreenRedCounts {
    /// Period return > 0.
    pub green: usize,
    /// Period return <= 0, including securities with a single observation,
    /// whose return over the period is taken as zero.
    pub red: usize,
}

impl GreenRedCounts {
    pub fn total(&self) -> usize {
        self.green + self.red
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rankings {
    pub gainers: Vec<RankedSecurity>,
    pub losers: Vec<RankedSecurity>,
    pub volatility: Vec<RankedSecurity>,
    pub counts: GreenRedCounts,
    /// Securities left out of every ranking for lack of data.
    pub excluded: Vec<String>,
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Sample standard deviation of the present daily returns.
pub fn volatility(series: &TimeSeries) -> Option<f64> {
    let present: Vec<f64> = returns::daily_returns(series)
        .into_iter()
        .filter_map(|p| p.value)
        .collect();
    sample_std_dev(&present)
}

fn by_value_desc(a: &RankedSecurity, b: &RankedSecurity) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| a.ticker.cmp(&b.ticker))
}

fn by_value_asc(a: &RankedSecurity, b: &RankedSecurity) -> Ordering {
    a.value
        .total_cmp(&b.value)
        .then_with(|| a.ticker.cmp(&b.ticker))
}

fn top(
    mut items: Vec<RankedSecurity>,
    n: usize,
    cmp: fn(&RankedSecurity, &RankedSecurity) -> Ordering,
) -> Vec<RankedSecurity> {
    items.sort_by(cmp);
    items.truncate(n);
    items
}

pub fn rank(map: &SeriesMap, config: &RankingConfig) -> Rankings {
    let mut qualifying = Vec::new();
    let mut volatile = Vec::new();
    let mut excluded = Vec::new();
    let mut unchanged = 0;

    for (ticker, series) in map {
        if series.len() < MIN_OBSERVATIONS {
            if !series.is_empty() {
                unchanged += 1;
            }
            tracing::debug!(
                ticker = %ticker,
                observations = series.len(),
                "excluded from rankings"
            );
            excluded.push(ticker.clone());
            continue;
        }
        match returns::period_return(series) {
            Ok(r) if r.is_finite() => qualifying.push(RankedSecurity {
                ticker: ticker.clone(),
                value: r,
            }),
            Ok(_) | Err(_) => {
                tracing::debug!(ticker = %ticker, "excluded from rankings: undefined return");
                excluded.push(ticker.clone());
                continue;
            }
        }
        if let Some(v) = volatility(series).filter(|v| v.is_finite()) {
            volatile.push(RankedSecurity {
                ticker: ticker.clone(),
                value: v,
            });
        }
    }

    let green = qualifying.iter().filter(|r| r.value > 0.0).count();
    let counts = GreenRedCounts {
        green,
        red: qualifying.len() - green + unchanged,
    };

    Rankings {
        gainers: top(qualifying.clone(), config.top_n, by_value_desc),
        losers: top(qualifying, config.top_n, by_value_asc),
        volatility: top(volatile, config.top_n, by_value_desc),
        counts,
        excluded,
    }
}
