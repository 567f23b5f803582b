//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use crate::models::{OrderSpec, SellSizing};
use bigdecimal::BigDecimal;
use num_traits::Zero;
use solana_sdk::signature::Keypair;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_POOL_KEYS_PATH: &str = "lp_json.json";
pub const DEFAULT_RESTART_COOLDOWN_MS: u64 = 1_000;

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Solana JSON-RPC endpoint.
    pub rpc_url: String,
    /// Raydium pool-keys JSON file.
    pub pool_keys_path: String,
    pub orders: OrderSpec,
    /// Slippage tolerance in basis points; 0 accepts no shortfall.
    pub slippage_bps: u64,
    /// Pause before the supervisor restarts a failed run.
    pub restart_cooldown: Duration,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup. Every value is validated here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let buy_count: usize = env.parse_required(&["BUY_ORDER_COUNT", "BUY_ORDER_NO"])?;
        let sell_count: usize = env.parse_required(&["SELL_ORDER_COUNT", "SELL_ORDER_NO"])?;
        if buy_count + sell_count == 0 {
            return Err(AppError::Config(
                "BUY_ORDER_COUNT and SELL_ORDER_COUNT are both zero".into(),
            ));
        }

        let buy_amount = env.amount("BUY_ORDER_AMOUNT")?;
        let sell_sizing = match env.get(&["SELL_SIZING"]).as_deref() {
            None | Some("fixed") => SellSizing::Fixed(env.amount("SELL_ORDER_AMOUNT")?),
            Some("proportional") => SellSizing::Proportional,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "SELL_SIZING must be `fixed` or `proportional`, got `{other}`"
                )));
            }
        };

        let interval_ms: u64 = env.parse_required(&["ORDER_INTERVAL_MS", "ORDER_INTERVAL"])?;
        let repeat_cycles: Option<u64> = env.parse_optional(&["REPEAT_CYCLES"])?;
        if repeat_cycles == Some(0) {
            return Err(AppError::Config("REPEAT_CYCLES must be at least 1".into()));
        }

        let orders = OrderSpec {
            buy_count,
            sell_count,
            buy_amount,
            sell_sizing,
            interval: Duration::from_millis(interval_ms),
            repeat_cycles,
        };

        Ok(Self {
            rpc_url: env
                .get(&["RPC_URL"])
                .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            pool_keys_path: env
                .get(&["POOL_KEYS_PATH"])
                .unwrap_or_else(|| DEFAULT_POOL_KEYS_PATH.to_string()),
            orders,
            slippage_bps: env.parse_optional(&["SLIPPAGE_BPS"])?.unwrap_or(0),
            restart_cooldown: Duration::from_millis(
                env.parse_optional(&["RESTART_COOLDOWN_MS"])?
                    .unwrap_or(DEFAULT_RESTART_COOLDOWN_MS),
            ),
        })
    }
}

/// Load the payer from `WALLET_SECRET_KEY`.
pub fn load_payer() -> Result<Keypair> {
    let secret = std::env::var("WALLET_SECRET_KEY")
        .map_err(|_| AppError::Config("WALLET_SECRET_KEY is not set".into()))?;
    parse_keypair(&secret)
}

/// Accepts a base58 secret key or a JSON byte array (Solana CLI keypair file).
pub fn parse_keypair(secret: &str) -> Result<Keypair> {
    let secret = secret.trim();
    let bytes: Vec<u8> = if secret.starts_with('[') {
        serde_json::from_str(secret)
            .map_err(|e| AppError::Config(format!("WALLET_SECRET_KEY is not a byte array: {e}")))?
    } else {
        bs58::decode(secret)
            .into_vec()
            .map_err(|e| AppError::Config(format!("WALLET_SECRET_KEY is not base58: {e}")))?
    };
    Keypair::from_bytes(&bytes)
        .map_err(|e| AppError::Config(format!("WALLET_SECRET_KEY is not a keypair: {e}")))
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// First non-empty value among `keys`.
    fn get(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| (self.lookup)(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }

    fn parse_optional<T>(&self, keys: &[&str]) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(keys) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| AppError::Config(format!("{} = `{raw}`: {e}", keys[0]))),
        }
    }

    fn parse_required<T>(&self, keys: &[&str]) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parse_optional(keys)?
            .ok_or_else(|| AppError::Config(format!("{} is not set", keys[0])))
    }

    /// Strictly positive decimal amount.
    fn amount(&self, key: &str) -> Result<BigDecimal> {
        let amount: BigDecimal = self.parse_required(&[key])?;
        if amount <= BigDecimal::zero() {
            return Err(AppError::Config(format!("{key} must be positive")));
        }
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Signer;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const BASE: &[(&str, &str)] = &[
        ("BUY_ORDER_AMOUNT", "0.01"),
        ("BUY_ORDER_COUNT", "2"),
        ("SELL_ORDER_AMOUNT", "0.02"),
        ("SELL_ORDER_COUNT", "3"),
        ("ORDER_INTERVAL_MS", "1500"),
    ];

    fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut pairs: Vec<_> = BASE.to_vec();
        pairs.retain(|(k, _)| !extra.iter().any(|(e, _)| e == k));
        pairs.extend_from_slice(extra);
        pairs
    }

    #[test]
    fn loads_defaults() {
        let cfg = load(BASE).unwrap();
        assert_eq!(cfg.orders.buy_count, 2);
        assert_eq!(cfg.orders.sell_count, 3);
        assert_eq!(cfg.orders.interval, Duration::from_millis(1500));
        assert_eq!(cfg.orders.repeat_cycles, None);
        assert_eq!(
            cfg.orders.sell_sizing,
            SellSizing::Fixed(BigDecimal::from_str("0.02").unwrap())
        );
        assert_eq!(cfg.slippage_bps, 0);
        assert_eq!(cfg.restart_cooldown, Duration::from_millis(1000));
        assert_eq!(cfg.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(cfg.pool_keys_path, DEFAULT_POOL_KEYS_PATH);
    }

    #[test]
    fn accepts_legacy_key_names() {
        let cfg = load(&[
            ("BUY_ORDER_AMOUNT", "0.01"),
            ("BUY_ORDER_NO", "1"),
            ("SELL_ORDER_AMOUNT", "0.01"),
            ("SELL_ORDER_NO", "4"),
            ("ORDER_INTERVAL", "10"),
        ])
        .unwrap();
        assert_eq!(cfg.orders.buy_count, 1);
        assert_eq!(cfg.orders.sell_count, 4);
        assert_eq!(cfg.orders.interval, Duration::from_millis(10));
    }

    #[test]
    fn missing_count_fails_fast() {
        let pairs: Vec<_> = BASE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "BUY_ORDER_COUNT")
            .collect();
        let err = load(&pairs).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("BUY_ORDER_COUNT")));
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert!(load(&with(&[("ORDER_INTERVAL_MS", "soon")])).is_err());
        assert!(load(&with(&[("BUY_ORDER_AMOUNT", "lots")])).is_err());
        assert!(load(&with(&[("SELL_ORDER_COUNT", "-1")])).is_err());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(load(&with(&[("BUY_ORDER_AMOUNT", "0")])).is_err());
    }

    #[test]
    fn empty_schedule_is_rejected() {
        assert!(load(&with(&[("BUY_ORDER_COUNT", "0"), ("SELL_ORDER_COUNT", "0")])).is_err());
    }

    #[test]
    fn repeat_cap_and_sizing_options() {
        let cfg = load(&with(&[
            ("REPEAT_CYCLES", "3"),
            ("SELL_SIZING", "proportional"),
            ("SLIPPAGE_BPS", "50"),
        ]))
        .unwrap();
        assert_eq!(cfg.orders.repeat_cycles, Some(3));
        assert_eq!(cfg.orders.sell_sizing, SellSizing::Proportional);
        assert_eq!(cfg.slippage_bps, 50);
        assert!(load(&with(&[("REPEAT_CYCLES", "0")])).is_err());
        assert!(load(&with(&[("SELL_SIZING", "random")])).is_err());
    }

    #[test]
    fn keypair_from_base58_and_json() {
        let kp = Keypair::new();
        let from_b58 = parse_keypair(&kp.to_base58_string()).unwrap();
        assert_eq!(from_b58.pubkey(), kp.pubkey());

        let json = serde_json::to_string(&kp.to_bytes().to_vec()).unwrap();
        let from_json = parse_keypair(&json).unwrap();
        assert_eq!(from_json.pubkey(), kp.pubkey());

        assert!(matches!(parse_keypair("0OIl"), Err(AppError::Config(_))));
        assert!(matches!(parse_keypair("[1,2,3]"), Err(AppError::Config(_))));
    }
}
