/*
[INPUT]:  HTTP configuration (base URL, listing path, timeouts)
[OUTPUT]: `WalletRecord` listings from the backend
[POS]:    HTTP layer - wallet directory client
[UPDATE]: When the listing endpoint or its response shape changes
*/

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::error::{FeedError, Result};
use crate::store::DashboardStore;
use crate::types::WalletRecord;

/// Default listing endpoint, relative to the backend base URL
pub const DEFAULT_WALLETS_PATH: &str = "/wallets/list/";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Source of the wallet identities the feeds update
#[async_trait]
pub trait WalletDirectory: Send + Sync {
    async fn list_wallets(&self) -> Result<Vec<WalletRecord>>;

    /// List wallets and replace the store's wallet set, returning the count
    async fn load_into(&self, store: &DashboardStore) -> Result<usize> {
        let wallets = self.list_wallets().await?;
        let count = wallets.len();
        store.replace_wallets(wallets);
        Ok(count)
    }
}

/// Wallet directory backed by the dashboard backend's REST API
#[derive(Debug, Clone)]
pub struct HttpWalletDirectory {
    http_client: Client,
    list_url: Url,
}

impl HttpWalletDirectory {
    /// Create a directory client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_WALLETS_PATH, ClientConfig::default())
    }

    /// Create a directory client with a custom listing path and configuration
    pub fn with_config(base_url: &str, list_path: &str, config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        let list_url = Url::parse(base_url)?.join(list_path)?;

        Ok(Self {
            http_client,
            list_url,
        })
    }

    pub fn list_url(&self) -> &Url {
        &self.list_url
    }
}

#[async_trait]
impl WalletDirectory for HttpWalletDirectory {
    /// GET {base}/wallets/list/
    async fn list_wallets(&self) -> Result<Vec<WalletRecord>> {
        debug!(url = %self.list_url, "listing wallets");
        let response = self.http_client.get(self.list_url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::invalid_response(status, body));
        }

        let body = response.text().await?;
        let wallets: Vec<WalletRecord> = serde_json::from_str(&body)?;
        info!(count = wallets.len(), "wallet directory loaded");
        Ok(wallets)
    }
}
