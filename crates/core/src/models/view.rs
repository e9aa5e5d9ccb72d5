use serde::{Deserialize, Serialize};

/// Why a view has nothing to draw. Empty is a normal terminal state, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyReason {
    /// The catalog itself is empty
    NoAccounts,
    /// Net worth page with no account ticked; nothing was fetched
    NoAccountsSelected,
    /// Accounts were fetched but had no values in range
    NoData,
    /// Portfolio page with every portfolio unticked
    NoPortfoliosSelected,
    /// No Asset account with a known asset class in the selected portfolios
    NoClassifiedAssets,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoAccounts => "No accounts found",
            EmptyReason::NoAccountsSelected => "Please select some accounts to view the chart",
            EmptyReason::NoData => "No data available for the selected accounts and date range",
            EmptyReason::NoPortfoliosSelected => "Please select at least one portfolio",
            EmptyReason::NoClassifiedAssets => {
                "No assets with asset classes found for the selected portfolios"
            }
        }
    }
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// What a page section shows: loading, empty, an error message, or data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewState<T> {
    Loading,
    Empty(EmptyReason),
    Error(String),
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ViewState::Empty(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Result of a refresh that may have been overtaken by a newer one.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// This refresh is still the latest; show its state
    Applied(ViewState<T>),
    /// A newer refresh started before this one finished; drop the result
    Discarded { generation: u64 },
}

impl<T> FetchOutcome<T> {
    pub fn is_discarded(&self) -> bool {
        matches!(self, FetchOutcome::Discarded { .. })
    }

    pub fn into_state(self) -> Option<ViewState<T>> {
        match self {
            FetchOutcome::Applied(state) => Some(state),
            FetchOutcome::Discarded { .. } => None,
        }
    }
}
