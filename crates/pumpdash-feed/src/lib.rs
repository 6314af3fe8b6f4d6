/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public dashboard feed crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod error;
pub mod http;
pub mod merge;
pub mod store;
pub mod types;
pub mod ws;

pub use error::{FeedError, Result};

pub use http::{ClientConfig, HttpWalletDirectory, WalletDirectory};

pub use store::DashboardStore;

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    ClientFrame,
    Feed,
    FeedSession,
    InboundFrame,
    LiquidityFeed,
    MarketFeed,
    SessionConfig,
    resolve_endpoint,
};
