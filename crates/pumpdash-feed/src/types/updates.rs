/*
[INPUT]:  `payload` objects of inbound `update` frames
[OUTPUT]: Partial update structs with per-field presence
[POS]:    Data layer - feed payload definitions
[UPDATE]: When the backend adds or renames payload keys
*/

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// Partial payload of the market/wallet feed.
///
/// The backend sends one sub-key per frame in practice, but any combination
/// is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MarketUpdate {
    #[serde(default, alias = "curveState")]
    pub curve_state: Option<CurveStateDelta>,
    /// SOL balance per wallet name
    #[serde(
        default,
        rename = "lam",
        alias = "lamportsByWallet",
        deserialize_with = "balances"
    )]
    pub lamports_by_wallet: Option<HashMap<String, Decimal>>,
    /// Token balance per wallet name
    #[serde(
        default,
        rename = "token",
        alias = "tokenAmountByWallet",
        deserialize_with = "balances"
    )]
    pub token_amount_by_wallet: Option<HashMap<String, Decimal>>,
}

impl MarketUpdate {
    pub fn is_empty(&self) -> bool {
        self.curve_state.is_none()
            && self.lamports_by_wallet.is_none()
            && self.token_amount_by_wallet.is_none()
    }
}

/// Bonding curve keys carried under `curve_state`.
///
/// Same presence rules as [`LiquidityUpdate`]: `null` is a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CurveStateDelta {
    #[serde(default, alias = "liquidity", deserialize_with = "present")]
    pub liq: Option<Option<Decimal>>,
    #[serde(default, alias = "marketCap", deserialize_with = "present")]
    pub mcap: Option<Option<Decimal>>,
}

/// Partial payload of the liquidity/PnL feed.
///
/// Outer `None`: key absent, leave the store alone.
/// `Some(None)`: key present with `null`, store becomes unknown.
/// `Some(Some(v))`: overwrite with `v`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LiquidityUpdate {
    #[serde(default, deserialize_with = "present")]
    pub liquidity: Option<Option<Decimal>>,
    #[serde(
        default,
        rename = "pnl_digit",
        alias = "pnlAbsolute",
        deserialize_with = "present"
    )]
    pub pnl_absolute: Option<Option<Decimal>>,
    #[serde(default, alias = "pnlPercent", deserialize_with = "present")]
    pub pnl_percent: Option<Option<Decimal>>,
    #[serde(default, alias = "totalBalance", deserialize_with = "present")]
    pub total_balance: Option<Option<Decimal>>,
}

impl LiquidityUpdate {
    pub fn is_empty(&self) -> bool {
        self.liquidity.is_none()
            && self.pnl_absolute.is_none()
            && self.pnl_percent.is_none()
            && self.total_balance.is_none()
    }
}

// Only called when the key exists, so a JSON null still counts as present.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Entries that are null or not a representable number are dropped one by one
// so the rest of the frame still lands.
fn balances<'de, D>(deserializer: D) -> Result<Option<HashMap<String, Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<HashMap<String, Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let mut parsed = HashMap::with_capacity(raw.len());
    for (name, value) in raw {
        if value.is_null() {
            debug!(wallet = %name, "null balance entry skipped");
            continue;
        }
        match <Decimal as Deserialize>::deserialize(value) {
            Ok(amount) => {
                parsed.insert(name, amount);
            }
            Err(err) => debug!(wallet = %name, error = %err, "unparseable balance entry skipped"),
        }
    }
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn market_update_reads_backend_keys() {
        let raw = r#"{"curve_state": {"mcap": 6250.5, "liq": 12.75}, "lam": {"dev": 0.5}}"#;
        let update: MarketUpdate = serde_json::from_str(raw).unwrap();

        let curve = update.curve_state.expect("curve_state present");
        assert_eq!(curve.liq, Some(Some(dec("12.75"))));
        assert_eq!(curve.mcap, Some(Some(dec("6250.5"))));
        assert_eq!(
            update.lamports_by_wallet.unwrap().get("dev").copied(),
            Some(dec("0.5"))
        );
        assert!(update.token_amount_by_wallet.is_none());
    }

    #[test]
    fn market_update_accepts_camel_case_aliases() {
        let raw = r#"{"tokenAmountByWallet": {"group1_3": 1000}}"#;
        let update: MarketUpdate = serde_json::from_str(raw).unwrap();
        assert_eq!(
            update.token_amount_by_wallet.unwrap().get("group1_3").copied(),
            Some(dec("1000"))
        );
    }

    #[test]
    fn empty_payload_is_empty() {
        let update: MarketUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
        let update: LiquidityUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn liquidity_update_distinguishes_null_from_absent() {
        let raw = r#"{"liquidity": 0, "pnl_digit": null, "pnl_percent": -3.5}"#;
        let update: LiquidityUpdate = serde_json::from_str(raw).unwrap();

        assert_eq!(update.liquidity, Some(Some(Decimal::ZERO)));
        assert_eq!(update.pnl_absolute, Some(None));
        assert_eq!(update.pnl_percent, Some(Some(dec("-3.5"))));
        assert_eq!(update.total_balance, None);
    }

    #[test]
    fn curve_state_null_is_present() {
        let update: MarketUpdate = serde_json::from_str(r#"{"curve_state": {"liq": null}}"#).unwrap();
        let curve = update.curve_state.unwrap();
        assert_eq!(curve.liq, Some(None));
        assert_eq!(curve.mcap, None);
    }

    #[test]
    fn bad_balance_entries_are_skipped_individually() {
        let raw = r#"{"lam": {"A": 1.5, "B": null, "C": "lots"}, "curve_state": {"mcap": 9}}"#;
        let update: MarketUpdate = serde_json::from_str(raw).unwrap();

        let lam = update.lamports_by_wallet.unwrap();
        assert_eq!(lam.len(), 1);
        assert_eq!(lam.get("A").copied(), Some(dec("1.5")));
        assert_eq!(update.curve_state.unwrap().mcap, Some(Some(dec("9"))));
    }

    #[test]
    fn null_balance_map_is_absent() {
        let update: MarketUpdate = serde_json::from_str(r#"{"token": null}"#).unwrap();
        assert!(update.token_amount_by_wallet.is_none());
    }
}
