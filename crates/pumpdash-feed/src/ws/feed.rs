/*
[INPUT]:  Feed identity and payload type
[OUTPUT]: Per-feed merge strategy plugged into `FeedSession`
[POS]:    WebSocket layer - feed definitions
[UPDATE]: When adding a new live feed
*/

use serde::de::DeserializeOwned;

use crate::store::DashboardStore;
use crate::types::{LiquidityUpdate, MarketUpdate};

/// One live feed: what its update payload looks like and how it lands in the store.
pub trait Feed: Send + Sync + 'static {
    type Payload: DeserializeOwned + Send + 'static;

    /// Short name used in logs
    const NAME: &'static str;

    /// Merge one payload, returning whether the store changed
    fn merge(store: &DashboardStore, payload: Self::Payload) -> bool;
}

/// Bonding curve stats plus per-wallet SOL/token balances
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketFeed;

impl Feed for MarketFeed {
    type Payload = MarketUpdate;
    const NAME: &'static str = "market";

    fn merge(store: &DashboardStore, payload: MarketUpdate) -> bool {
        store.apply_market_update(payload)
    }
}

/// Pool liquidity and PnL figures
#[derive(Debug, Clone, Copy, Default)]
pub struct LiquidityFeed;

impl Feed for LiquidityFeed {
    type Payload = LiquidityUpdate;
    const NAME: &'static str = "liquidity";

    fn merge(store: &DashboardStore, payload: LiquidityUpdate) -> bool {
        store.apply_liquidity_update(payload)
    }
}
