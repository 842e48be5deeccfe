//! Per-security summary rows and the market overview cards.

use crate::domain::ranking::{self, GreenRedCounts, RankingConfig};
use crate::domain::returns::{self, mean};
use crate::domain::series::SeriesMap;
use serde::Serialize;

/// One row of the market summary export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecuritySummary {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Yearly Return (%)")]
    pub yearly_return_pct: Option<f64>,
    #[serde(rename = "Average Price")]
    pub average_price: Option<f64>,
    #[serde(rename = "Average Volume")]
    pub average_volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityRow {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Volatility")]
    pub volatility: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketOverview {
    pub counts: GreenRedCounts,
    /// Mean close over every row of the dataset.
    pub average_price: Option<f64>,
    /// Mean volume over every row of the dataset.
    pub average_volume: Option<f64>,
    pub securities: usize,
    pub observations: usize,
}

/// One summary row per security, in identifier order. Securities without a
/// defined period return still get a row with the return left empty.
pub fn summarize(map: &SeriesMap) -> Vec<SecuritySummary> {
    map.values()
        .map(|series| {
            let record = returns::summarize(series);
            SecuritySummary {
                symbol: record.ticker,
                yearly_return_pct: record.period_return.map(|r| r * 100.0),
                average_price: record.mean_close,
                average_volume: record.mean_volume,
            }
        })
        .collect()
}

/// Top `top_n` securities by descending volatility.
pub fn volatility_rows(map: &SeriesMap, top_n: usize) -> Vec<VolatilityRow> {
    ranking::rank(map, &RankingConfig { top_n })
        .volatility
        .into_iter()
        .map(|r| VolatilityRow {
            symbol: r.ticker,
            volatility: r.value,
        })
        .collect()
}

pub fn overview(map: &SeriesMap, counts: GreenRedCounts) -> MarketOverview {
    let all = || map.values().flat_map(|s| s.observations.iter());
    MarketOverview {
        counts,
        average_price: mean(all().map(|o| o.close)),
        average_volume: mean(all().map(|o| o.volume)),
        securities: map.len(),
        observations: all().count(),
    }
}
