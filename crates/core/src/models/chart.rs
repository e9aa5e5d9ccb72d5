use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::account::AssetClass;
use super::selection::ViewMode;

/// Label of the single series produced by the aggregated view.
pub const TOTAL_NET_WORTH_LABEL: &str = "Total Net Worth";

/// A single point of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// A labelled, date-ordered series ready for a line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// `"Total Net Worth"` in the aggregated view, the account name in the split view
    pub label: String,

    /// Points in ascending date order
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<SeriesPoint>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }
}

/// Headline numbers shown under the aggregated net worth chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSummary {
    /// Value at the latest date
    pub current_value: f64,

    /// Value at the earliest date
    pub starting_value: f64,

    /// current_value - starting_value
    pub change: f64,

    /// change / starting_value * 100, or 0 when the starting value is 0
    pub change_pct: f64,
}

/// Everything the net worth page renders for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorthChart {
    pub view_mode: ViewMode,
    pub series: Vec<Series>,
    /// Only computed for the aggregated view
    pub summary: Option<NetWorthSummary>,
}

/// One stacked bar segment series: an asset class's amount for each month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub asset_class: AssetClass,
    /// Aligned with `PortfolioBreakdown::labels`; 0.0 where the class had no value
    pub amounts: Vec<f64>,
}

/// Monthly totals per asset class, ready for a stacked bar chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioBreakdown {
    /// Distinct `"YYYY-MM"` month keys in ascending order
    pub labels: Vec<String>,

    /// One entry per asset class present, ordered by class name
    pub series: Vec<CategorySeries>,
}

impl PortfolioBreakdown {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sum across all asset classes for the month at `index`.
    pub fn month_total(&self, index: usize) -> f64 {
        self.series
            .iter()
            .filter_map(|s| s.amounts.get(index))
            .sum()
    }

    /// Share of the month's total held by `asset_class`, as a percentage.
    /// Returns 0.0 when the class is absent or the month total is not positive.
    pub fn share_pct(&self, asset_class: AssetClass, index: usize) -> f64 {
        let total = self.month_total(index);
        if total <= 0.0 {
            return 0.0;
        }
        self.series
            .iter()
            .find(|s| s.asset_class == asset_class)
            .and_then(|s| s.amounts.get(index))
            .map(|amount| amount / total * 100.0)
            .unwrap_or(0.0)
    }

    /// Month labels formatted for display, e.g. `"Jan 2024"`.
    /// Keys that are not `YYYY-MM` are passed through unchanged.
    pub fn display_labels(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|key| {
                NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
                    .map(|d| d.format("%b %Y").to_string())
                    .unwrap_or_else(|_| key.clone())
            })
            .collect()
    }
}
