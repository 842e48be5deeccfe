//! Dashboard controller.
//!
//! Owns the loaded, immutable [`SeriesMap`] and answers every panel of the
//! dashboard from it. Each call recomputes from the map; nothing is cached.

use crate::domain::correlation::{self, CorrelationMatrix};
use crate::domain::error::StockdashError;
use crate::domain::ohlcv::Observation;
use crate::domain::ranking::{self, RankingConfig, Rankings};
use crate::domain::returns::{self, CumulativePoint, MIN_OBSERVATIONS};
use crate::domain::series::{self, SeriesMap};
use crate::domain::summary::{self, MarketOverview};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_RECENT_ROWS: usize = 20;
pub const DEFAULT_CUMULATIVE_TOP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub top_n: usize,
    pub recent_rows: usize,
    pub cumulative_top: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            top_n: ranking::DEFAULT_TOP_N,
            recent_rows: DEFAULT_RECENT_ROWS,
            cumulative_top: DEFAULT_CUMULATIVE_TOP,
        }
    }
}

/// Detail panel for the selected security.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityView {
    pub ticker: String,
    pub recent: Vec<Observation>,
    pub close_series: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeLeader {
    pub ticker: String,
    pub final_return: f64,
    pub series: Vec<CumulativePoint>,
}

/// Date x leader pivot of cumulative returns. `cells[d][l]` is absent when
/// leader `l` has no observation on `dates[d]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CumulativeChart {
    pub dates: Vec<NaiveDate>,
    pub tickers: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

/// Every panel of one render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub securities: Vec<String>,
    pub overview: MarketOverview,
    pub selection: Option<SecurityView>,
    pub rankings: Rankings,
    pub cumulative: CumulativeChart,
    pub correlation: CorrelationMatrix,
}

pub struct Dashboard {
    data: SeriesMap,
    settings: DashboardSettings,
}

impl Dashboard {
    pub fn new(data: SeriesMap, settings: DashboardSettings) -> Self {
        Self { data, settings }
    }

    /// Selectable identifiers, ascending.
    pub fn securities(&self) -> Vec<String> {
        series::identifiers(&self.data)
    }

    pub fn rankings(&self) -> Rankings {
        ranking::rank(
            &self.data,
            &RankingConfig {
                top_n: self.settings.top_n,
            },
        )
    }

    pub fn overview(&self) -> MarketOverview {
        summary::overview(&self.data, self.rankings().counts)
    }

    pub fn selection(&self, ticker: &str) -> Result<SecurityView, StockdashError> {
        let series = self
            .data
            .get(ticker)
            .ok_or_else(|| StockdashError::UnknownSecurity {
                ticker: ticker.to_string(),
            })?;
        Ok(SecurityView {
            ticker: series.ticker.clone(),
            recent: series.recent(self.settings.recent_rows).to_vec(),
            close_series: series
                .observations
                .iter()
                .map(|o| (o.date, o.close))
                .collect(),
        })
    }

    /// Top securities by final cumulative return, ties by identifier.
    pub fn cumulative_leaders(&self) -> Vec<CumulativeLeader> {
        let mut leaders: Vec<CumulativeLeader> = self
            .data
            .values()
            .filter(|s| s.len() >= MIN_OBSERVATIONS)
            .filter_map(|s| {
                let series = returns::cumulative_returns(s);
                let final_return = series.last()?.value;
                final_return.is_finite().then(|| CumulativeLeader {
                    ticker: s.ticker.clone(),
                    final_return,
                    series,
                })
            })
            .collect();
        leaders.sort_by(|a, b| {
            b.final_return
                .total_cmp(&a.final_return)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        leaders.truncate(self.settings.cumulative_top);
        leaders
    }

    pub fn cumulative_chart(&self) -> CumulativeChart {
        pivot_cumulative(&self.cumulative_leaders())
    }

    pub fn correlation(&self) -> CorrelationMatrix {
        correlation::correlation_matrix(&self.data)
    }

    /// Bundles all panels. With no explicit selection the first identifier
    /// is shown, as a select box would default to it.
    pub fn snapshot(&self, selected: Option<&str>) -> Result<DashboardSnapshot, StockdashError> {
        let securities = self.securities();
        let selection = match selected.or_else(|| securities.first().map(String::as_str)) {
            Some(ticker) => Some(self.selection(ticker)?),
            None => None,
        };
        let rankings = self.rankings();
        Ok(DashboardSnapshot {
            overview: summary::overview(&self.data, rankings.counts),
            securities,
            selection,
            rankings,
            cumulative: self.cumulative_chart(),
            correlation: self.correlation(),
        })
    }
}

fn pivot_cumulative(leaders: &[CumulativeLeader]) -> CumulativeChart {
    let dates: Vec<NaiveDate> = leaders
        .iter()
        .flat_map(|l| l.series.iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let lookups: Vec<BTreeMap<NaiveDate, f64>> = leaders
        .iter()
        .map(|l| {
            let mut by_date = BTreeMap::new();
            for p in &l.series {
                by_date.entry(p.date).or_insert(p.value);
            }
            by_date
        })
        .collect();

    let cells = dates
        .iter()
        .map(|d| lookups.iter().map(|m| m.get(d).copied()).collect())
        .collect();

    CumulativeChart {
        tickers: leaders.iter().map(|l| l.ticker.clone()).collect(),
        dates,
        cells,
    }
}
