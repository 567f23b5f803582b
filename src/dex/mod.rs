//! Raydium AMM v4 integration: pool keys, reserves, pricing and swap assembly.

use crate::errors::Result;
use crate::models::{Direction, SwapAmounts};
use bigdecimal::BigDecimal;
use solana_sdk::signature::Keypair;
use tracing::info;

pub mod calc;
pub mod client;
pub mod keys;
pub mod state;
pub mod tx;

pub use calc::{apply_slippage, compute_amount_out, resolve_amounts, to_base_units};
pub use client::{Ledger, RpcLedger, fetch_reserves};
pub use keys::PoolKeys;
pub use state::PoolReserveSnapshot;
pub use tx::TransactionAssembler;

/// Read-only handles shared by every component. Owned by `main`.
pub struct BotContext<L> {
    pub ledger: L,
    pub payer: Keypair,
    pub pool: PoolKeys,
    pub slippage_bps: u64,
}

impl<L: Ledger> BotContext<L> {
    pub fn new(ledger: L, payer: Keypair, pool: PoolKeys, slippage_bps: u64) -> Self {
        Self {
            ledger,
            payer,
            pool,
            slippage_bps,
        }
    }
}

/// Turns desired trade sizes into swap amounts against live reserves.
pub struct AmountResolver<'a, L> {
    ctx: &'a BotContext<L>,
}

impl<'a, L: Ledger> AmountResolver<'a, L> {
    pub fn new(ctx: &'a BotContext<L>) -> Self {
        Self { ctx }
    }

    /// Fetch fresh reserves and size the swap. `desired` is in quote display units.
    pub async fn resolve(&self, direction: Direction, desired: &BigDecimal) -> Result<SwapAmounts> {
        let reserves = fetch_reserves(&self.ctx.ledger, &self.ctx.pool).await?;
        let amounts = resolve_amounts(
            &self.ctx.pool,
            &reserves,
            direction,
            desired,
            self.ctx.slippage_bps,
        )?;
        info!(
            ?direction,
            %desired,
            amount_in = amounts.amount_in,
            min_amount_out = amounts.min_amount_out,
            "[QUOTE] amounts resolved"
        );
        Ok(amounts)
    }
}
