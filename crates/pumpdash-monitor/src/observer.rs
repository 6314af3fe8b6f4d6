/*
[INPUT]:  Dashboard store change notifications
[OUTPUT]: Structured log lines describing the current dashboard state
[POS]:    Presentation layer - headless stand-in for the dashboard view
[UPDATE]: When the store gains new slices or summary fields change
*/

use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use pumpdash_feed::{DashboardStore, WalletGroup, WalletRecord};

/// Aggregate of one wallet group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub group: WalletGroup,
    pub wallets: usize,
    pub sol_balance: Decimal,
    pub token_balance: Decimal,
}

/// Per-group totals in the fixed order the dashboard lists groups.
/// Empty groups are omitted.
pub fn summarize_wallets(wallets: &[WalletRecord]) -> Vec<GroupSummary> {
    const ORDER: [WalletGroup; 5] = [
        WalletGroup::Dev,
        WalletGroup::Fund,
        WalletGroup::Group1,
        WalletGroup::Group2,
        WalletGroup::Archive,
    ];

    ORDER
        .iter()
        .filter_map(|group| {
            let members = wallets.iter().filter(|w| w.group == *group);
            let mut summary = GroupSummary {
                group: *group,
                wallets: 0,
                sol_balance: Decimal::ZERO,
                token_balance: Decimal::ZERO,
            };
            for wallet in members {
                summary.wallets += 1;
                summary.sol_balance += wallet.sol_balance;
                summary.token_balance += wallet.token_balance;
            }
            (summary.wallets > 0).then_some(summary)
        })
        .collect()
}

/// Spawn a task logging every store change until `shutdown` fires
pub fn spawn_observer(store: DashboardStore, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut market_rx = store.subscribe_market();
        let mut wallets_rx = store.subscribe_wallets();
        let mut liquidity_rx = store.subscribe_liquidity();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = market_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let market = market_rx.borrow_and_update().clone();
                    info!(
                        liquidity = ?market.liquidity,
                        market_cap = ?market.market_cap,
                        "market stats updated"
                    );
                }
                changed = wallets_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let wallets = wallets_rx.borrow_and_update().clone();
                    for summary in summarize_wallets(&wallets) {
                        debug!(
                            group = ?summary.group,
                            wallets = summary.wallets,
                            sol = %summary.sol_balance,
                            tokens = %summary.token_balance,
                            "wallet group balances"
                        );
                    }
                    info!(wallet_count = wallets.len(), "wallet balances updated");
                }
                changed = liquidity_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let stats = liquidity_rx.borrow_and_update().clone();
                    info!(
                        liquidity = ?stats.liquidity,
                        pnl = ?stats.pnl_absolute,
                        pnl_percent = ?stats.pnl_percent,
                        total_balance = ?stats.total_balance,
                        "liquidity stats updated"
                    );
                }
            }
        }
        debug!("store observer stopped");
    })
}
