/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed monitor configuration and derived feed endpoints
[POS]:    Configuration layer - backend addresses and feed tuning
[UPDATE]: When adding new configuration options
*/

use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use pumpdash_feed::{SessionConfig, resolve_endpoint};

/// Top-level configuration for the dashboard monitor
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// Base URL of the main backend (market/wallet feed, wallet listing)
    pub backend_url: String,
    /// Base URL of the liquidity service; falls back to `backend_url`
    #[serde(default)]
    pub liquidity_url: Option<String>,
    #[serde(default = "default_feed_path")]
    pub market_path: String,
    #[serde(default = "default_feed_path")]
    pub liquidity_path: String,
    #[serde(default = "default_wallets_path")]
    pub wallets_path: String,
    /// Seconds between liveness probes
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    /// Send `refresh` on the market feed this often, if set
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// What to do when a feed session closes unexpectedly
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_reconnect_enabled")]
    pub enabled: bool,
    /// Consecutive failed connects before giving up; `None` retries forever
    #[serde(default = "default_max_retries")]
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: default_reconnect_enabled(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_feed_path() -> String {
    "/data/".to_string()
}

fn default_wallets_path() -> String {
    "/wallets/list/".to_string()
}

fn default_keepalive_secs() -> u64 {
    5
}

fn default_reconnect_enabled() -> bool {
    true
}

fn default_max_retries() -> Option<u32> {
    Some(10)
}

impl MonitorConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.keepalive_secs == 0 {
            bail!("keepalive_secs must be greater than zero");
        }
        if self.refresh_interval_secs == Some(0) {
            bail!("refresh_interval_secs must be greater than zero when set");
        }
        self.market_endpoint().context("market feed endpoint")?;
        self.liquidity_endpoint().context("liquidity feed endpoint")?;
        Ok(())
    }

    pub fn market_endpoint(&self) -> anyhow::Result<String> {
        Ok(resolve_endpoint(&self.backend_url, &self.market_path)?.to_string())
    }

    pub fn liquidity_endpoint(&self) -> anyhow::Result<String> {
        let base = self.liquidity_url.as_deref().unwrap_or(&self.backend_url);
        Ok(resolve_endpoint(base, &self.liquidity_path)?.to_string())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            keepalive_interval: Duration::from_secs(self.keepalive_secs),
            ..SessionConfig::default()
        }
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs.map(Duration::from_secs)
    }
}
