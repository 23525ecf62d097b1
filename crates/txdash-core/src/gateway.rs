//! Remote data gateway
//!
//! Three independent read-only queries against the transaction service.
//! The gateway is stateless; every call maps failures onto [`GatewayError`]
//! and never touches display state.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use txdash_config::{Config, Month};

use crate::error::{CoreError, GatewayError};
use crate::models::{HistogramBucket, PagedResult, Statistics, TransactionsPayload};

/// Gateway shared between the controller's fetch tasks
pub type GatewayRef = Arc<dyn DataGateway>;

/// Service endpoints queried by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Transactions,
    Statistics,
    Histogram,
}

impl Endpoint {
    /// Path relative to the service base address
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Transactions => "/api/transactions",
            Endpoint::Statistics => "/api/statistics",
            Endpoint::Histogram => "/api/bar-chart",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Read-only queries backing the dashboard
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// One page of transactions for `month` matching `search_text`
    async fn fetch_transactions(
        &self,
        month: Month,
        page: u32,
        search_text: &str,
    ) -> Result<PagedResult, GatewayError>;

    /// Sale statistics for `month`
    async fn fetch_statistics(&self, month: Month) -> Result<Statistics, GatewayError>;

    /// Price-range histogram for `month`
    async fn fetch_histogram(&self, month: Month) -> Result<Vec<HistogramBucket>, GatewayError>;
}

/// Longest response body excerpt kept in a status error
const BODY_EXCERPT_LEN: usize = 200;

/// HTTP implementation of [`DataGateway`]
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http_client: HttpClient,
    base_url: String,
}

impl HttpGateway {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:3001";

    /// Create a gateway for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CoreError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::InternalError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a gateway from the service section of the configuration
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        Self::new(
            config.service_base_url(),
            Duration::from_secs(config.service.request_timeout_secs),
        )
    }

    /// Base address without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// GET `endpoint` with `query` and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let url = self.url(endpoint);
        log::debug!(target: "txdash::gateway", "GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                endpoint,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                endpoint,
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT_LEN).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| GatewayError::Transport {
            endpoint,
            message: e.to_string(),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Malformed {
            endpoint,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn fetch_transactions(
        &self,
        month: Month,
        page: u32,
        search_text: &str,
    ) -> Result<PagedResult, GatewayError> {
        let page = page.to_string();
        let payload: TransactionsPayload = self
            .get_json(
                Endpoint::Transactions,
                &[("month", month.name()), ("page", page.as_str()), ("searchText", search_text)],
            )
            .await?;
        Ok(payload.into())
    }

    async fn fetch_statistics(&self, month: Month) -> Result<Statistics, GatewayError> {
        self.get_json(Endpoint::Statistics, &[("month", month.name())]).await
    }

    async fn fetch_histogram(&self, month: Month) -> Result<Vec<HistogramBucket>, GatewayError> {
        self.get_json(Endpoint::Histogram, &[("month", month.name())]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Transactions.path(), "/api/transactions");
        assert_eq!(Endpoint::Statistics.path(), "/api/statistics");
        assert_eq!(Endpoint::Histogram.path(), "/api/bar-chart");
    }

    #[test]
    fn test_base_url_is_normalized() {
        let gateway = HttpGateway::new("http://svc:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(gateway.base_url(), "http://svc:3001");
        assert_eq!(gateway.url(Endpoint::Histogram), "http://svc:3001/api/bar-chart");
    }

    #[test]
    fn test_from_config() {
        let gateway = HttpGateway::from_config(&Config::default()).unwrap();
        assert_eq!(gateway.base_url(), HttpGateway::DEFAULT_BASE_URL);
    }
}
