use futures::future::try_join_all;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::traits::DashboardApi;
use crate::errors::CoreError;
use crate::models::value::{DateRange, Value};

/// Fans out one value request per account and joins them.
pub struct FetchService;

impl FetchService {
    pub fn new() -> Self {
        Self
    }

    /// Fetch the value history of every named account.
    ///
    /// - No names: returns an empty list without touching the API.
    /// - Requests run concurrently; if any fails, the whole batch fails.
    /// - Results are concatenated in `names` order.
    pub async fn fetch_values(
        &self,
        api: &dyn DashboardApi,
        names: &[String],
        range: Option<&DateRange>,
    ) -> Result<Vec<Value>, CoreError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Fetching values for {} account(s)", names.len());
        let batches = try_join_all(
            names
                .iter()
                .map(|name| api.values_for_account(name, range)),
        )
        .await?;

        Ok(batches.into_iter().flatten().collect())
    }
}

impl Default for FetchService {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic request counter used to drop results that arrive after a newer request began.
#[derive(Debug, Default)]
pub struct RequestGenerations {
    latest: AtomicU64,
}

/// Identifies one request batch issued by [`RequestGenerations::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new batch; every earlier generation becomes stale.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}
