use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::account::Account;
use crate::models::settings::ClientSettings;
use crate::models::value::{DateRange, Value, ValueQuery};

use super::traits::DashboardApi;

/// HTTP client for the dashboard backend.
///
/// - **Accounts**: `/accounts/`, `/accounts/{name}`
/// - **Values**: `/values/`, `/values/account/{name}`
///
/// Account names are the resource keys and are percent-encoded as a single
/// path segment, so names containing spaces or slashes are safe.
pub struct HttpDashboardApi {
    client: Client,
    base_url: Url,
}

impl HttpDashboardApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        let base_url = Url::parse(settings.base_url.trim())
            .map_err(|e| CoreError::Config(format!("Invalid base URL '{}': {e}", settings.base_url)))?;

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(settings.timeout_secs));
        let client = builder
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned, Q: serde::Serialize + ?Sized>(
        &self,
        url: Url,
        query: Option<&Q>,
    ) -> Result<T, CoreError> {
        debug!("GET {}", url.path());
        let mut request = self.client.get(url);
        if let Some(query) = query {
            request = request.query(query);
        }
        let resp = ensure_success(request.send().await?).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Build `base/segment/segment...`, encoding each segment on its own.
///
/// A trailing empty segment produces a trailing slash (`/accounts/`).
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, CoreError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| CoreError::Config(format!("Base URL '{base}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn ensure_success(resp: Response) -> Result<Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(CoreError::Api {
        status: status.as_u16(),
        message: api_error_message(status, &body),
    })
}

/// Prefer the server's `{"detail": "..."}` message, fall back to the status text.
fn api_error_message(status: StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DashboardApi for HttpDashboardApi {
    async fn list_accounts(&self) -> Result<Vec<Account>, CoreError> {
        let url = endpoint_url(&self.base_url, &["accounts", ""])?;
        self.get_json::<_, ()>(url, None).await
    }

    async fn get_account(&self, name: &str) -> Result<Account, CoreError> {
        let url = endpoint_url(&self.base_url, &["accounts", name])?;
        match self.get_json::<_, ()>(url, None).await {
            Err(CoreError::Api { status: 404, .. }) => {
                Err(CoreError::AccountNotFound(name.to_string()))
            }
            other => other,
        }
    }

    async fn list_values(&self, query: &ValueQuery) -> Result<Vec<Value>, CoreError> {
        let url = endpoint_url(&self.base_url, &["values", ""])?;
        self.get_json(url, Some(query)).await
    }

    async fn values_for_account(
        &self,
        name: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<Value>, CoreError> {
        let url = endpoint_url(&self.base_url, &["values", "account", name])?;
        self.get_json(url, range).await
    }
}
