//! Static Raydium AMM v4 pool descriptor.

use crate::errors::{AppError, Result};
use serde::{Deserialize, Deserializer};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;

use crate::models::Direction;

/// Every address and precision the swap path needs. Loaded once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolKeys {
    #[serde(deserialize_with = "pubkey")]
    pub id: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub base_mint: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub quote_mint: Pubkey,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    #[serde(deserialize_with = "pubkey")]
    pub program_id: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub authority: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub open_orders: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub target_orders: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub base_vault: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub quote_vault: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub market_program_id: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub market_id: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub market_authority: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub market_base_vault: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub market_quote_vault: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub market_bids: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub market_asks: Pubkey,
    #[serde(deserialize_with = "pubkey")]
    pub market_event_queue: Pubkey,
}

/// Mint and precision of one leg of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub mint: Pubkey,
    pub decimals: u8,
}

impl PoolKeys {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| AppError::Config(format!("pool keys: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn base(&self) -> Currency {
        Currency {
            mint: self.base_mint,
            decimals: self.base_decimals,
        }
    }

    pub fn quote(&self) -> Currency {
        Currency {
            mint: self.quote_mint,
            decimals: self.quote_decimals,
        }
    }

    /// (spent, received) for a direction. Inbound spends quote.
    pub fn currencies(&self, direction: Direction) -> (Currency, Currency) {
        match direction {
            Direction::Inbound => (self.quote(), self.base()),
            Direction::Outbound => (self.base(), self.quote()),
        }
    }
}

fn pubkey<'de, D>(deserializer: D) -> std::result::Result<Pubkey, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Pubkey::from_str(&raw).map_err(|e| serde::de::Error::custom(format!("{raw}: {e}")))
}
