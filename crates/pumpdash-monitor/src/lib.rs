/*
[INPUT]:  Public API exports for pumpdash-monitor crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod observer;
pub mod supervisor;

pub use config::{MonitorConfig, ReconnectConfig};
pub use observer::{GroupSummary, spawn_observer, summarize_wallets};
pub use supervisor::{ConnectionState, FeedSupervisor};
