/*
[INPUT]:  Parsed `MarketUpdate` / `LiquidityUpdate` payloads
[OUTPUT]: Field-level writes into `DashboardStore`
[POS]:    State layer - partial update merging (no I/O)
[UPDATE]: When payload keys or merge rules change
*/

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::store::DashboardStore;
use crate::types::{CurveStateDelta, LiquidityUpdate, MarketStats, MarketUpdate, WalletRecord};

impl DashboardStore {
    /// Merge a market/wallet feed payload.
    ///
    /// Only keys present in the payload are written. Wallet maps never add or
    /// remove records; names without a record are skipped. Returns whether
    /// anything observable changed.
    pub fn apply_market_update(&self, update: MarketUpdate) -> bool {
        let MarketUpdate {
            curve_state,
            lamports_by_wallet,
            token_amount_by_wallet,
        } = update;

        let mut changed = false;

        if let Some(delta) = curve_state {
            changed |= self.modify_market(|stats| merge_curve_state(stats, delta));
        }

        if lamports_by_wallet.is_some() || token_amount_by_wallet.is_some() {
            changed |= self.modify_wallets(|wallets| {
                let mut touched = false;
                if let Some(balances) = &lamports_by_wallet {
                    touched |= merge_balances(wallets, balances, "lam", |w| &mut w.sol_balance);
                }
                if let Some(balances) = &token_amount_by_wallet {
                    touched |= merge_balances(wallets, balances, "token", |w| &mut w.token_balance);
                }
                touched
            });
        }

        changed
    }

    /// Merge a liquidity/PnL feed payload.
    ///
    /// A key carrying `null` resets the field to unknown; an absent key leaves
    /// it untouched.
    pub fn apply_liquidity_update(&self, update: LiquidityUpdate) -> bool {
        self.modify_liquidity(|stats| {
            let mut changed = false;
            changed |= assign_present(&mut stats.liquidity, update.liquidity);
            changed |= assign_present(&mut stats.pnl_absolute, update.pnl_absolute);
            changed |= assign_present(&mut stats.pnl_percent, update.pnl_percent);
            changed |= assign_present(&mut stats.total_balance, update.total_balance);
            changed
        })
    }
}

fn merge_curve_state(stats: &mut MarketStats, delta: CurveStateDelta) -> bool {
    let mut changed = false;
    changed |= assign_present(&mut stats.liquidity, delta.liq);
    changed |= assign_present(&mut stats.market_cap, delta.mcap);
    changed
}

fn merge_balances(
    wallets: &mut [WalletRecord],
    balances: &HashMap<String, Decimal>,
    key: &'static str,
    field: impl Fn(&mut WalletRecord) -> &mut Decimal,
) -> bool {
    let mut changed = false;

    // Duplicate names all receive the same value.
    for wallet in wallets.iter_mut() {
        if let Some(value) = balances.get(&wallet.name) {
            changed |= assign(field(wallet), *value);
        }
    }

    let unknown: Vec<&str> = balances
        .keys()
        .filter(|name| !wallets.iter().any(|wallet| &wallet.name == *name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        debug!(key, ?unknown, "balance update for unknown wallets ignored");
    }

    changed
}

fn assign_present<T: PartialEq>(slot: &mut Option<T>, incoming: Option<Option<T>>) -> bool {
    match incoming {
        Some(value) => assign(slot, value),
        None => false,
    }
}

fn assign<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
