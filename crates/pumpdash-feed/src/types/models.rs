/*
[INPUT]:  Wallet directory responses and merged feed updates
[OUTPUT]: Latest-value models held by the dashboard store
[POS]:    Data layer - store models
[UPDATE]: When dashboard panels need new fields
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::WalletGroup;

/// Bonding curve stats shown in the market panel.
///
/// `None` means the value has not been received yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarketStats {
    pub liquidity: Option<Decimal>,
    pub market_cap: Option<Decimal>,
}

/// One managed wallet, identified by `name`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WalletRecord {
    pub name: String,
    pub address: String,
    pub group: WalletGroup,
    #[serde(default)]
    pub sol_balance: Decimal,
    #[serde(default)]
    pub token_balance: Decimal,
}

impl WalletRecord {
    /// Record with zero balances, as listed before any feed update arrives
    pub fn new(name: impl Into<String>, address: impl Into<String>, group: WalletGroup) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            group,
            sol_balance: Decimal::ZERO,
            token_balance: Decimal::ZERO,
        }
    }
}

/// Liquidity pool and PnL figures from the liquidity feed.
///
/// `None` means unknown: never received, or explicitly null on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LiquidityStats {
    pub liquidity: Option<Decimal>,
    pub pnl_absolute: Option<Decimal>,
    pub pnl_percent: Option<Decimal>,
    pub total_balance: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn wallet_record_parses_directory_entry() {
        let raw = r#"{
            "address": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
            "group": "fund",
            "name": "fund_1",
            "sol_balance": 1.25
        }"#;

        let record: WalletRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.name, "fund_1");
        assert_eq!(record.group, WalletGroup::Fund);
        assert_eq!(record.sol_balance, Decimal::from_str("1.25").unwrap());
        assert_eq!(record.token_balance, Decimal::ZERO);
    }

    #[test]
    fn defaults_are_unknown() {
        assert_eq!(MarketStats::default().liquidity, None);
        assert_eq!(LiquidityStats::default().pnl_percent, None);
    }
}
