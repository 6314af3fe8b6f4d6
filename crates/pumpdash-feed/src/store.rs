/*
[INPUT]:  Wallet directory listings and merged feed updates
[OUTPUT]: Latest-value snapshots and `watch` receivers for observers
[POS]:    State layer - shared dashboard store (no I/O)
[UPDATE]: When adding store sections or changing notification semantics
*/

use std::sync::Arc;

use tokio::sync::watch;

use crate::types::{LiquidityStats, MarketStats, WalletRecord};

/// Observable store for everything the dashboard renders live.
///
/// Cloning is cheap and every clone points at the same state. Writers are the
/// update merger and [`DashboardStore::replace_wallets`]; readers either take
/// a snapshot or hold a `watch::Receiver` and drop it to unsubscribe.
#[derive(Debug, Clone)]
pub struct DashboardStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    market: watch::Sender<MarketStats>,
    wallets: watch::Sender<Vec<WalletRecord>>,
    liquidity: watch::Sender<LiquidityStats>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::with_wallets(Vec::new())
    }

    /// Store seeded with a wallet listing
    pub fn with_wallets(wallets: Vec<WalletRecord>) -> Self {
        let (market, _) = watch::channel(MarketStats::default());
        let (wallets, _) = watch::channel(wallets);
        let (liquidity, _) = watch::channel(LiquidityStats::default());

        Self {
            inner: Arc::new(StoreInner {
                market,
                wallets,
                liquidity,
            }),
        }
    }

    pub fn market(&self) -> MarketStats {
        self.inner.market.borrow().clone()
    }

    pub fn wallets(&self) -> Vec<WalletRecord> {
        self.inner.wallets.borrow().clone()
    }

    pub fn wallet(&self, name: &str) -> Option<WalletRecord> {
        self.inner
            .wallets
            .borrow()
            .iter()
            .find(|wallet| wallet.name == name)
            .cloned()
    }

    pub fn liquidity(&self) -> LiquidityStats {
        self.inner.liquidity.borrow().clone()
    }

    pub fn subscribe_market(&self) -> watch::Receiver<MarketStats> {
        self.inner.market.subscribe()
    }

    pub fn subscribe_wallets(&self) -> watch::Receiver<Vec<WalletRecord>> {
        self.inner.wallets.subscribe()
    }

    pub fn subscribe_liquidity(&self) -> watch::Receiver<LiquidityStats> {
        self.inner.liquidity.subscribe()
    }

    /// Replace the wallet identities, e.g. after the directory was re-listed.
    ///
    /// This is the only way wallets are added or removed.
    pub fn replace_wallets(&self, wallets: Vec<WalletRecord>) {
        self.inner.wallets.send_replace(wallets);
    }

    /// Mutate market stats, notifying observers only when `modify` reports a change
    pub(crate) fn modify_market(&self, modify: impl FnOnce(&mut MarketStats) -> bool) -> bool {
        self.inner.market.send_if_modified(modify)
    }

    pub(crate) fn modify_wallets(
        &self,
        modify: impl FnOnce(&mut Vec<WalletRecord>) -> bool,
    ) -> bool {
        self.inner.wallets.send_if_modified(modify)
    }

    pub(crate) fn modify_liquidity(
        &self,
        modify: impl FnOnce(&mut LiquidityStats) -> bool,
    ) -> bool {
        self.inner.liquidity.send_if_modified(modify)
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}
