use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::account::{Account, Classification, Portfolio};
use super::value::DateRange;

/// Selected names still present in `visible`, first occurrence only, in selection order.
pub fn reconcile_names(selected: &[String], visible: &[String]) -> Vec<String> {
    let visible: HashSet<&str> = visible.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    selected
        .iter()
        .filter(|name| visible.contains(name.as_str()) && seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// How the net worth chart presents the selected accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One line: the sum of all selected accounts per date
    #[default]
    Aggregated,
    /// One line per selected account
    Split,
}

/// Rolling window for the portfolio breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "all")]
    All,
}

impl TimeWindow {
    /// First included date for a window ending at `today`, or `None` for `All`.
    ///
    /// The cutoff is always the first day of a month: `3m` on 2024-05-17 is 2024-02-01.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        let months = match self {
            TimeWindow::ThreeMonths => 3,
            TimeWindow::SixMonths => 6,
            TimeWindow::OneYear => 12,
            TimeWindow::All => return None,
        };
        let month_start = today.with_day(1)?;
        Some(
            month_start
                .checked_sub_months(Months::new(months))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::ThreeMonths => "3m",
            TimeWindow::SixMonths => "6m",
            TimeWindow::OneYear => "1y",
            TimeWindow::All => "all",
        }
    }
}

/// A set of active classification labels.
///
/// Labels of the same dimension are alternatives (OR); different dimensions
/// must all match (AND). The empty filter matches every account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    labels: BTreeSet<Classification>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Classification> {
        self.labels.iter()
    }

    pub fn contains(&self, label: &Classification) -> bool {
        self.labels.contains(label)
    }

    pub fn insert(&mut self, label: Classification) -> bool {
        self.labels.insert(label)
    }

    pub fn remove(&mut self, label: &Classification) -> bool {
        self.labels.remove(label)
    }

    /// Whether `account` passes the filter.
    pub fn matches(&self, account: &Account) -> bool {
        let mut dimensions: Vec<_> = self.labels.iter().map(|l| l.dimension()).collect();
        dimensions.dedup();
        dimensions.iter().all(|dimension| {
            account
                .classification_in(*dimension)
                .is_some_and(|label| self.labels.contains(&label))
        })
    }
}

impl FromIterator<Classification> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = Classification>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

/// User actions on the net worth page.
#[derive(Debug, Clone, PartialEq)]
pub enum NetWorthAction {
    ToggleFilter(Classification),
    SetFilters(FilterSpec),
    ClearFilters,
    ToggleAccount(String),
    /// Select every account in the given (visible) list, in that order
    SelectAllAccounts(Vec<String>),
    ClearAccounts,
    /// Drop selected accounts that are no longer visible
    Reconcile(Vec<String>),
    SetViewMode(ViewMode),
    SetDateRange(Option<DateRange>),
}

/// Ephemeral state of the net worth page. Created with defaults on mount,
/// changed only through [`NetWorthSelection::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSelection {
    pub filters: FilterSpec,
    /// Account names in the order the user selected them
    pub selected_accounts: Vec<String>,
    pub view_mode: ViewMode,
    pub date_range: Option<DateRange>,
}

impl NetWorthSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure reducer: returns the state after `action`.
    #[must_use]
    pub fn apply(mut self, action: NetWorthAction) -> Self {
        match action {
            NetWorthAction::ToggleFilter(label) => {
                if !self.filters.remove(&label) {
                    self.filters.insert(label);
                }
            }
            NetWorthAction::SetFilters(filters) => self.filters = filters,
            NetWorthAction::ClearFilters => self.filters = FilterSpec::new(),
            NetWorthAction::ToggleAccount(name) => {
                if let Some(pos) = self.selected_accounts.iter().position(|n| *n == name) {
                    self.selected_accounts.remove(pos);
                } else {
                    self.selected_accounts.push(name);
                }
            }
            NetWorthAction::SelectAllAccounts(names) => {
                let mut seen = BTreeSet::new();
                self.selected_accounts = names
                    .into_iter()
                    .filter(|n| seen.insert(n.clone()))
                    .collect();
            }
            NetWorthAction::ClearAccounts => self.selected_accounts.clear(),
            NetWorthAction::Reconcile(visible) => {
                self.selected_accounts = reconcile_names(&self.selected_accounts, &visible);
            }
            NetWorthAction::SetViewMode(mode) => self.view_mode = mode,
            NetWorthAction::SetDateRange(range) => {
                self.date_range = range.filter(|r| !r.is_unbounded());
            }
        }
        self
    }
}

/// User actions on the portfolio breakdown page.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakdownAction {
    TogglePortfolio(Portfolio),
    SelectAllPortfolios,
    ClearPortfolios,
    SetWindow(TimeWindow),
}

/// Ephemeral state of the portfolio breakdown page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownSelection {
    pub portfolios: BTreeSet<Portfolio>,
    pub window: TimeWindow,
}

impl Default for BreakdownSelection {
    fn default() -> Self {
        Self {
            portfolios: Portfolio::ALL.into_iter().collect(),
            window: TimeWindow::default(),
        }
    }
}

impl BreakdownSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure reducer: returns the state after `action`.
    #[must_use]
    pub fn apply(mut self, action: BreakdownAction) -> Self {
        match action {
            BreakdownAction::TogglePortfolio(p) => {
                if !self.portfolios.remove(&p) {
                    self.portfolios.insert(p);
                }
            }
            BreakdownAction::SelectAllPortfolios => {
                self.portfolios = Portfolio::ALL.into_iter().collect();
            }
            BreakdownAction::ClearPortfolios => self.portfolios.clear(),
            BreakdownAction::SetWindow(window) => self.window = window,
        }
        self
    }
}
