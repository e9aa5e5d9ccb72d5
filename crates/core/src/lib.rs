pub mod api;
pub mod errors;
pub mod models;
pub mod services;

use chrono::NaiveDate;
use log::{debug, error, warn};
use std::collections::HashMap;
use std::sync::Arc;

use api::http::HttpDashboardApi;
use api::traits::DashboardApi;
use errors::CoreError;
use models::{
    account::{validate_catalog, Account, AssetClass, Classification},
    chart::{NetWorthChart, PortfolioBreakdown},
    selection::{BreakdownSelection, FilterSpec, NetWorthSelection, ViewMode},
    settings::ClientSettings,
    value::ClassifiedValue,
    view::{EmptyReason, FetchOutcome, ViewState},
};
use services::{
    aggregation_service::AggregationService,
    breakdown_service::BreakdownService,
    fetch_service::{FetchService, Generation, RequestGenerations},
    filter_service::FilterService,
};

const ACCOUNTS_ERROR: &str = "Failed to load accounts";
const LABELS_ERROR: &str = "Failed to load tags";
const CHART_ERROR: &str = "Failed to load chart data";

/// Main entry point for the dashboard core library.
///
/// Owns the API client, the services and one request counter per page.
/// Selection state is not stored here: callers keep their own
/// `NetWorthSelection` / `BreakdownSelection` and pass it in.
#[must_use]
pub struct NetWorthDashboard {
    api: Arc<dyn DashboardApi>,
    filter_service: FilterService,
    aggregation_service: AggregationService,
    breakdown_service: BreakdownService,
    fetch_service: FetchService,
    net_worth_requests: RequestGenerations,
    breakdown_requests: RequestGenerations,
}

impl std::fmt::Debug for NetWorthDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetWorthDashboard")
            .field("net_worth_generation", &self.net_worth_requests.latest())
            .field("breakdown_generation", &self.breakdown_requests.latest())
            .finish()
    }
}

impl NetWorthDashboard {
    /// Connect to the HTTP backend described by `settings`.
    pub fn new(settings: &ClientSettings) -> Result<Self, CoreError> {
        let api = HttpDashboardApi::new(settings)?;
        Ok(Self::with_api(Arc::new(api)))
    }

    /// Build on top of any `DashboardApi` implementation.
    pub fn with_api(api: Arc<dyn DashboardApi>) -> Self {
        Self {
            api,
            filter_service: FilterService::new(),
            aggregation_service: AggregationService::new(),
            breakdown_service: BreakdownService::new(),
            fetch_service: FetchService::new(),
            net_worth_requests: RequestGenerations::new(),
            breakdown_requests: RequestGenerations::new(),
        }
    }

    // ── Account Catalog ─────────────────────────────────────────────

    /// Fetch the full account catalog once.
    ///
    /// Duplicate or empty names violate the catalog invariant; they are
    /// logged and dropped (first occurrence wins) rather than failing the page.
    pub async fn load_accounts(&self) -> ViewState<Vec<Account>> {
        match self.api.list_accounts().await {
            Ok(accounts) => {
                let accounts = sanitize_catalog(accounts);
                if accounts.is_empty() {
                    ViewState::Empty(EmptyReason::NoAccounts)
                } else {
                    ViewState::Ready(accounts)
                }
            }
            Err(e) => {
                error!("Error fetching accounts: {e}");
                ViewState::Error(ACCOUNTS_ERROR.to_string())
            }
        }
    }

    /// Fetch the catalog and list every classification label it uses.
    pub async fn load_labels(&self) -> ViewState<Vec<Classification>> {
        match self.api.list_accounts().await {
            Ok(accounts) => {
                let labels = self.filter_service.available_labels(&accounts);
                if labels.is_empty() {
                    ViewState::Empty(EmptyReason::NoAccounts)
                } else {
                    ViewState::Ready(labels)
                }
            }
            Err(e) => {
                error!("Error fetching tags: {e}");
                ViewState::Error(LABELS_ERROR.to_string())
            }
        }
    }

    // ── Filtering ───────────────────────────────────────────────────

    /// Accounts of `catalog` visible under `filters`, in catalog order.
    #[must_use]
    pub fn visible_accounts(&self, catalog: &[Account], filters: &FilterSpec) -> Vec<Account> {
        self.filter_service.filter(catalog, filters)
    }

    /// Selection after dropping accounts hidden by its current filters.
    pub fn reconcile_selection(
        &self,
        catalog: &[Account],
        selection: NetWorthSelection,
    ) -> NetWorthSelection {
        let visible = self.filter_service.visible_names(catalog, &selection.filters);
        selection.apply(models::selection::NetWorthAction::Reconcile(visible))
    }

    // ── Net Worth ───────────────────────────────────────────────────

    /// Fetch and aggregate the values of the selected accounts.
    ///
    /// Selected names unknown to `catalog` are ignored. With nothing selected
    /// no request is made. Returns `Discarded` when another call started
    /// while this one was waiting on the network.
    pub async fn net_worth_chart(
        &self,
        selection: &NetWorthSelection,
        catalog: &[Account],
    ) -> FetchOutcome<NetWorthChart> {
        let generation = self.net_worth_requests.begin();

        let catalog_names: Vec<String> = catalog.iter().map(|a| a.name.clone()).collect();
        let names = self
            .filter_service
            .reconcile(&selection.selected_accounts, &catalog_names);
        if names.is_empty() {
            return FetchOutcome::Applied(ViewState::Empty(EmptyReason::NoAccountsSelected));
        }

        let result = self
            .fetch_service
            .fetch_values(self.api.as_ref(), &names, selection.date_range.as_ref())
            .await;

        if let Some(stale) = self.discard_if_stale(&self.net_worth_requests, generation) {
            return stale;
        }

        let values = match result {
            Ok(values) => values,
            Err(e) => {
                error!("Error loading chart data: {e}");
                return FetchOutcome::Applied(ViewState::Error(CHART_ERROR.to_string()));
            }
        };
        if values.is_empty() {
            return FetchOutcome::Applied(ViewState::Empty(EmptyReason::NoData));
        }

        let series = self
            .aggregation_service
            .aggregate(&values, selection.view_mode);
        let summary = match selection.view_mode {
            ViewMode::Aggregated => series
                .first()
                .and_then(|s| self.aggregation_service.summarize(s)),
            ViewMode::Split => None,
        };

        FetchOutcome::Applied(ViewState::Ready(NetWorthChart {
            view_mode: selection.view_mode,
            series,
            summary,
        }))
    }

    // ── Portfolio Breakdown ─────────────────────────────────────────

    /// Monthly asset-class breakdown with the window anchored at today's local date.
    pub async fn portfolio_breakdown_now(
        &self,
        selection: &BreakdownSelection,
        catalog: &[Account],
    ) -> FetchOutcome<PortfolioBreakdown> {
        let today = chrono::Local::now().date_naive();
        self.portfolio_breakdown(selection, catalog, today).await
    }

    /// Fetch asset values for the selected portfolios and stack them by month and
    /// asset class, keeping only values inside `selection.window` ending at `today`.
    pub async fn portfolio_breakdown(
        &self,
        selection: &BreakdownSelection,
        catalog: &[Account],
        today: NaiveDate,
    ) -> FetchOutcome<PortfolioBreakdown> {
        let generation = self.breakdown_requests.begin();

        if selection.portfolios.is_empty() {
            return FetchOutcome::Applied(ViewState::Empty(EmptyReason::NoPortfoliosSelected));
        }

        let candidates = self
            .filter_service
            .breakdown_candidates(catalog, &selection.portfolios);
        if candidates.is_empty() {
            return FetchOutcome::Applied(ViewState::Empty(EmptyReason::NoClassifiedAssets));
        }

        let classes: HashMap<&str, AssetClass> = candidates
            .iter()
            .filter_map(|a| a.asset_class.map(|c| (a.name.as_str(), c)))
            .collect();
        let names: Vec<String> = candidates.iter().map(|a| a.name.clone()).collect();

        let result = self
            .fetch_service
            .fetch_values(self.api.as_ref(), &names, None)
            .await;

        if let Some(stale) = self.discard_if_stale(&self.breakdown_requests, generation) {
            return stale;
        }

        let values = match result {
            Ok(values) => values,
            Err(e) => {
                error!("Error fetching values: {e}");
                return FetchOutcome::Applied(ViewState::Error(CHART_ERROR.to_string()));
            }
        };

        let classified: Vec<ClassifiedValue> = values
            .iter()
            .filter_map(|v| {
                classes
                    .get(v.account_name.as_str())
                    .map(|c| ClassifiedValue::new(*c, v))
            })
            .collect();

        let breakdown = self
            .breakdown_service
            .breakdown(&classified, selection.window, today);
        if breakdown.is_empty() {
            return FetchOutcome::Applied(ViewState::Empty(EmptyReason::NoData));
        }
        FetchOutcome::Applied(ViewState::Ready(breakdown))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn discard_if_stale<T>(
        &self,
        requests: &RequestGenerations,
        generation: Generation,
    ) -> Option<FetchOutcome<T>> {
        if requests.is_current(generation) {
            return None;
        }
        debug!(
            "Discarding stale response (generation {} < {})",
            generation.value(),
            requests.latest()
        );
        Some(FetchOutcome::Discarded {
            generation: generation.value(),
        })
    }
}

/// Drop accounts that break the catalog invariants, keeping the first of each name.
fn sanitize_catalog(accounts: Vec<Account>) -> Vec<Account> {
    if validate_catalog(&accounts).is_ok() {
        return accounts;
    }
    let mut seen = std::collections::HashSet::new();
    accounts
        .into_iter()
        .filter(|a| {
            if a.name.trim().is_empty() {
                warn!("Dropping account with an empty name");
                return false;
            }
            if !seen.insert(a.name.clone()) {
                warn!("Dropping duplicate account '{}'", a.name);
                return false;
            }
            true
        })
        .collect()
}
