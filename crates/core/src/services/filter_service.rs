use std::collections::BTreeSet;

use crate::models::account::{Account, AccountType, Classification, Portfolio};
use crate::models::selection::{reconcile_names, FilterSpec};

/// Computes which accounts are visible for a filter selection.
///
/// All operations are pure and preserve the input order of accounts.
pub struct FilterService;

impl FilterService {
    pub fn new() -> Self {
        Self
    }

    /// Accounts that pass `filter`: AND across dimensions, OR within a dimension.
    /// An empty filter returns every account.
    pub fn filter(&self, accounts: &[Account], filter: &FilterSpec) -> Vec<Account> {
        if filter.is_empty() {
            return accounts.to_vec();
        }
        accounts
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    /// Names of the accounts that pass `filter`, in catalog order.
    pub fn visible_names(&self, accounts: &[Account], filter: &FilterSpec) -> Vec<String> {
        accounts
            .iter()
            .filter(|a| filter.matches(a))
            .map(|a| a.name.clone())
            .collect()
    }

    /// Keep only the selected names that are still visible, in selection order.
    ///
    /// Repeated names collapse to their first occurrence. Never adds a name,
    /// and running it again on the same visible set changes nothing.
    pub fn reconcile(&self, selected: &[String], visible: &[String]) -> Vec<String> {
        reconcile_names(selected, visible)
    }

    /// Every distinct label used by the catalog, in label order.
    pub fn available_labels(&self, accounts: &[Account]) -> Vec<Classification> {
        accounts
            .iter()
            .flat_map(Account::classifications)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Accounts eligible for the portfolio breakdown: in one of `portfolios`,
    /// of type Asset, and with a known asset class.
    ///
    /// Unlike [`FilterService::filter`], an empty portfolio selection matches nothing.
    pub fn breakdown_candidates(
        &self,
        accounts: &[Account],
        portfolios: &BTreeSet<Portfolio>,
    ) -> Vec<Account> {
        accounts
            .iter()
            .filter(|a| a.portfolio.is_some_and(|p| portfolios.contains(&p)))
            .filter(|a| a.account_type == Some(AccountType::Asset))
            .filter(|a| a.asset_class.is_some())
            .cloned()
            .collect()
    }
}

impl Default for FilterService {
    fn default() -> Self {
        Self::new()
    }
}
