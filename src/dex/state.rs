use crate::errors::{AppError, Result};
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Account as TokenAccount;

/// Raydium's default swap fee, 0.25%.
pub const DEFAULT_FEE_NUMERATOR: u64 = 25;
pub const DEFAULT_FEE_DENOMINATOR: u64 = 10_000;

/// Size of a Raydium AMM v4 `AmmInfo` account.
pub const AMM_INFO_LEN: usize = 752;

// Byte offsets inside `AmmInfo`. Sixteen u64 header fields, then the fee block,
// then the state block.
const SWAP_FEE_NUMERATOR_OFFSET: usize = 176;
const SWAP_FEE_DENOMINATOR_OFFSET: usize = 184;
const NEED_TAKE_PNL_COIN_OFFSET: usize = 192;
const NEED_TAKE_PNL_PC_OFFSET: usize = 200;

/// Point-in-time reserves of a pool, in base units. Never cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolReserveSnapshot {
    pub base_reserve: u64,
    pub quote_reserve: u64,
    pub fee_numerator: u64,
    pub fee_denominator: u64,
}

/// Fields read from the AMM account itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmmAccountState {
    pub swap_fee_numerator: u64,
    pub swap_fee_denominator: u64,
    /// PnL owed to the protocol, still sitting in the base vault.
    pub need_take_pnl_base: u64,
    /// PnL owed to the protocol, still sitting in the quote vault.
    pub need_take_pnl_quote: u64,
}

impl PoolReserveSnapshot {
    pub fn new(base_reserve: u64, quote_reserve: u64) -> Self {
        Self {
            base_reserve,
            quote_reserve,
            fee_numerator: DEFAULT_FEE_NUMERATOR,
            fee_denominator: DEFAULT_FEE_DENOMINATOR,
        }
    }

    /// Combine the AMM account with its two vault balances.
    pub fn from_accounts(amm: &AmmAccountState, base_vault: u64, quote_vault: u64) -> Self {
        let (fee_numerator, fee_denominator) = if amm.swap_fee_denominator == 0 {
            (DEFAULT_FEE_NUMERATOR, DEFAULT_FEE_DENOMINATOR)
        } else {
            (amm.swap_fee_numerator, amm.swap_fee_denominator)
        };
        // Tokens parked in the OpenBook open-orders account are not counted.
        // Current AMM v4 pools keep that balance at zero, so the vaults alone
        // price the swap.
        Self {
            base_reserve: base_vault.saturating_sub(amm.need_take_pnl_base),
            quote_reserve: quote_vault.saturating_sub(amm.need_take_pnl_quote),
            fee_numerator,
            fee_denominator,
        }
    }
}

fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    data.get(offset..offset + 8)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u64::from_le_bytes)
        .ok_or_else(|| AppError::Quote(format!("AMM account truncated at offset {offset}")))
}

/// Decode the parts of `AmmInfo` that pricing needs.
pub fn decode_amm_account(data: &[u8]) -> Result<AmmAccountState> {
    if data.len() < AMM_INFO_LEN {
        return Err(AppError::Quote(format!(
            "AMM account too small: {} bytes",
            data.len()
        )));
    }
    Ok(AmmAccountState {
        swap_fee_numerator: read_u64(data, SWAP_FEE_NUMERATOR_OFFSET)?,
        swap_fee_denominator: read_u64(data, SWAP_FEE_DENOMINATOR_OFFSET)?,
        need_take_pnl_base: read_u64(data, NEED_TAKE_PNL_COIN_OFFSET)?,
        need_take_pnl_quote: read_u64(data, NEED_TAKE_PNL_PC_OFFSET)?,
    })
}

/// Token balance held by an SPL token account.
pub fn decode_vault_amount(data: &[u8]) -> Result<u64> {
    TokenAccount::unpack(data)
        .map(|account| account.amount)
        .map_err(|e| AppError::Quote(format!("vault account: {e}")))
}
