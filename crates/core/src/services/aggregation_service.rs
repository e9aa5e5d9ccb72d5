use std::collections::BTreeMap;

use crate::models::chart::{NetWorthSummary, Series, SeriesPoint, TOTAL_NET_WORTH_LABEL};
use crate::models::selection::ViewMode;
use crate::models::value::Value;

/// Turns fetched values into net worth series.
///
/// Works purely on already-fetched data; fetching belongs to `FetchService`.
/// Amounts are summed as-is: rounding is left to whoever formats them.
pub struct AggregationService;

impl AggregationService {
    pub fn new() -> Self {
        Self
    }

    /// Build the series for `mode`.
    ///
    /// - `Aggregated`: one "Total Net Worth" series, amounts summed per calendar date.
    /// - `Split`: one series per account, ordered by the account's first appearance
    ///   in `values` (selection order when values are concatenated per account).
    ///   Same-date values of one account stay separate points.
    ///
    /// Empty input gives an empty list.
    pub fn aggregate(&self, values: &[Value], mode: ViewMode) -> Vec<Series> {
        if values.is_empty() {
            return Vec::new();
        }

        match mode {
            ViewMode::Aggregated => vec![self.aggregate_total(values)],
            ViewMode::Split => self.split_by_account(values),
        }
    }

    fn aggregate_total(&self, values: &[Value]) -> Series {
        let mut totals: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
        for value in values {
            *totals.entry(value.date).or_insert(0.0) += value.amount;
        }
        let points = totals
            .into_iter()
            .map(|(date, amount)| SeriesPoint::new(date, amount))
            .collect();
        Series::new(TOTAL_NET_WORTH_LABEL, points)
    }

    fn split_by_account(&self, values: &[Value]) -> Vec<Series> {
        let mut series: Vec<Series> = Vec::new();
        for value in values {
            let point = SeriesPoint::new(value.date, value.amount);
            match series.iter_mut().find(|s| s.label == value.account_name) {
                Some(existing) => existing.points.push(point),
                None => series.push(Series::new(value.account_name.clone(), vec![point])),
            }
        }
        // stable: same-date points keep fetch order
        for s in &mut series {
            s.points.sort_by_key(|p| p.date);
        }
        series
    }

    /// Start/end figures for a series; `None` when it has no points.
    pub fn summarize(&self, series: &Series) -> Option<NetWorthSummary> {
        let starting_value = series.first()?.amount;
        let current_value = series.last()?.amount;
        let change = current_value - starting_value;
        let change_pct = if starting_value != 0.0 {
            change / starting_value * 100.0
        } else {
            0.0
        };
        Some(NetWorthSummary {
            current_value,
            starting_value,
            change,
            change_pct,
        })
    }
}

impl Default for AggregationService {
    fn default() -> Self {
        Self::new()
    }
}
