use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::account::AssetClass;
use crate::models::chart::{CategorySeries, PortfolioBreakdown};
use crate::models::selection::TimeWindow;
use crate::models::value::ClassifiedValue;

/// Groups asset values into monthly totals per asset class.
///
/// Inputs are expected to be Asset-type accounts with a known asset class;
/// `FilterService::breakdown_candidates` takes care of that upstream.
pub struct BreakdownService;

impl BreakdownService {
    pub fn new() -> Self {
        Self
    }

    /// Build the stacked monthly breakdown for values inside `window`,
    /// with the window anchored at `today`.
    pub fn breakdown(
        &self,
        values: &[ClassifiedValue],
        window: TimeWindow,
        today: NaiveDate,
    ) -> PortfolioBreakdown {
        let cutoff = window.cutoff(today);
        let in_window = values
            .iter()
            .filter(|v| cutoff.map_or(true, |c| v.date >= c));

        let mut monthly: BTreeMap<String, HashMap<AssetClass, f64>> = BTreeMap::new();
        let mut classes: BTreeSet<&'static str> = BTreeSet::new();
        let mut by_name: HashMap<&'static str, AssetClass> = HashMap::new();

        for value in in_window {
            *monthly
                .entry(month_key(value.date))
                .or_default()
                .entry(value.asset_class)
                .or_insert(0.0) += value.amount;
            let name = value.asset_class.as_str();
            classes.insert(name);
            by_name.insert(name, value.asset_class);
        }

        let series = classes
            .iter()
            .map(|name| {
                let asset_class = by_name[name];
                CategorySeries {
                    asset_class,
                    amounts: monthly
                        .values()
                        .map(|per_class| per_class.get(&asset_class).copied().unwrap_or(0.0))
                        .collect(),
                }
            })
            .collect();

        PortfolioBreakdown {
            labels: monthly.into_keys().collect(),
            series,
        }
    }
}

impl Default for BreakdownService {
    fn default() -> Self {
        Self::new()
    }
}

/// `"YYYY-MM"` key of the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
