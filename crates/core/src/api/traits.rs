use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::account::Account;
use crate::models::value::{DateRange, Value, ValueQuery};

/// Read-only view of the dashboard backend.
///
/// `HttpDashboardApi` talks to the real server; tests and offline frontends
/// plug in their own implementation.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DashboardApi: Send + Sync {
    /// `GET /accounts/`: the full catalog, unfiltered.
    async fn list_accounts(&self) -> Result<Vec<Account>, CoreError>;

    /// `GET /accounts/{name}`
    async fn get_account(&self, name: &str) -> Result<Account, CoreError>;

    /// `GET /values/` with optional filters and paging.
    async fn list_values(&self, query: &ValueQuery) -> Result<Vec<Value>, CoreError>;

    /// `GET /values/account/{name}` with optional inclusive date bounds.
    async fn values_for_account(
        &self,
        name: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<Value>, CoreError>;
}
