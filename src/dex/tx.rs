//! Swap transaction assembly for Raydium AMM v4.

use crate::dex::BotContext;
use crate::dex::client::Ledger;
use crate::dex::keys::PoolKeys;
use crate::errors::{AppError, Result};
use crate::models::{Direction, SwapAmounts, SwapOutcome};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::Signer,
    system_instruction,
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};
use spl_token::native_mint;
use tracing::{info, warn};

/// `swap_base_in`: exact input, bounded output.
pub const SWAP_BASE_IN: u8 = 9;

/// `[9, amount_in (u64 LE), min_amount_out (u64 LE)]`.
pub fn swap_instruction_data(amounts: &SwapAmounts) -> Vec<u8> {
    let mut data = Vec::with_capacity(17);
    data.push(SWAP_BASE_IN);
    data.extend_from_slice(&amounts.amount_in.to_le_bytes());
    data.extend_from_slice(&amounts.min_amount_out.to_le_bytes());
    data
}

/// The swap instruction. Account order and flags are fixed by the AMM program.
pub fn swap_instruction(
    pool: &PoolKeys,
    amounts: &SwapAmounts,
    spent_account: Pubkey,
    received_account: Pubkey,
    owner: Pubkey,
) -> Instruction {
    Instruction {
        program_id: pool.program_id,
        accounts: vec![
            AccountMeta::new_readonly(spl_token::ID, false),
            AccountMeta::new(pool.id, false),
            AccountMeta::new_readonly(pool.authority, false),
            AccountMeta::new(pool.open_orders, false),
            AccountMeta::new(pool.target_orders, false),
            AccountMeta::new(pool.base_vault, false),
            AccountMeta::new(pool.quote_vault, false),
            AccountMeta::new_readonly(pool.market_program_id, false),
            AccountMeta::new(pool.market_id, false),
            AccountMeta::new(pool.market_bids, false),
            AccountMeta::new(pool.market_asks, false),
            AccountMeta::new(pool.market_event_queue, false),
            AccountMeta::new(pool.market_base_vault, false),
            AccountMeta::new(pool.market_quote_vault, false),
            AccountMeta::new_readonly(pool.market_authority, false),
            AccountMeta::new(spent_account, false),
            AccountMeta::new(received_account, false),
            AccountMeta::new_readonly(owner, true),
        ],
        data: swap_instruction_data(amounts),
    }
}

/// Builds, signs and broadcasts one swap.
pub struct TransactionAssembler<'a, L> {
    ctx: &'a BotContext<L>,
}

impl<'a, L: Ledger> TransactionAssembler<'a, L> {
    pub fn new(ctx: &'a BotContext<L>) -> Self {
        Self { ctx }
    }

    /// `Some(create ATA)` when the owner's account for `mint` does not exist yet.
    async fn ensure_token_account(&self, mint: &Pubkey) -> Result<Option<Instruction>> {
        let owner = self.ctx.payer.pubkey();
        let ata = get_associated_token_address(&owner, mint);
        let existing = self
            .ctx
            .ledger
            .account(&ata)
            .await
            .map_err(AppError::into_account_preparation)?;
        match existing {
            Some(account) if account.owner == spl_token::ID => Ok(None),
            _ => Ok(Some(create_associated_token_account(
                &owner,
                &owner,
                mint,
                &spl_token::ID,
            ))),
        }
    }

    /// Every instruction of the swap transaction, in submission order.
    pub async fn instructions(
        &self,
        direction: Direction,
        amounts: &SwapAmounts,
    ) -> Result<Vec<Instruction>> {
        let pool = &self.ctx.pool;
        let owner = self.ctx.payer.pubkey();
        let (spent, received) = pool.currencies(direction);
        let spent_ata = get_associated_token_address(&owner, &spent.mint);
        let received_ata = get_associated_token_address(&owner, &received.mint);

        let mut instructions = Vec::new();
        for mint in [&spent.mint, &received.mint] {
            if let Some(create) = self.ensure_token_account(mint).await? {
                instructions.push(create);
            }
        }

        if spent.mint == native_mint::ID {
            instructions.push(system_instruction::transfer(
                &owner,
                &spent_ata,
                amounts.amount_in,
            ));
            instructions.push(
                spl_token::instruction::sync_native(&spl_token::ID, &spent_ata)
                    .map_err(|e| AppError::AccountPreparation(format!("sync_native: {e}")))?,
            );
        }

        instructions.push(swap_instruction(
            pool,
            amounts,
            spent_ata,
            received_ata,
            owner,
        ));

        let wrapped = if spent.mint == native_mint::ID {
            Some(spent_ata)
        } else if received.mint == native_mint::ID {
            Some(received_ata)
        } else {
            None
        };
        if let Some(wrapped) = wrapped {
            instructions.push(
                spl_token::instruction::close_account(
                    &spl_token::ID,
                    &wrapped,
                    &owner,
                    &owner,
                    &[],
                )
                .map_err(|e| AppError::AccountPreparation(format!("close_account: {e}")))?,
            );
        }

        Ok(instructions)
    }

    /// Signed transaction, or `None` when there is nothing to send.
    pub async fn build(
        &self,
        direction: Direction,
        amounts: &SwapAmounts,
    ) -> Result<Option<Transaction>> {
        let instructions = self.instructions(direction, amounts).await?;
        if instructions.is_empty() {
            return Ok(None);
        }
        let payer = &self.ctx.payer;
        let blockhash = self.ctx.ledger.latest_blockhash().await?;
        Ok(Some(Transaction::new_signed_with_payer(
            &instructions,
            Some(&payer.pubkey()),
            &[payer],
            blockhash,
        )))
    }

    pub async fn execute(&self, direction: Direction, amounts: &SwapAmounts) -> Result<SwapOutcome> {
        let Some(tx) = self.build(direction, amounts).await? else {
            warn!(?direction, "[SWAP] no instruction");
            return Ok(SwapOutcome::NothingToSubmit);
        };
        info!(
            ?direction,
            amount_in = amounts.amount_in,
            min_amount_out = amounts.min_amount_out,
            instructions = tx.message.instructions.len(),
            "[SWAP] sending"
        );
        let signature = self.ctx.ledger.broadcast(&tx).await?;
        Ok(SwapOutcome::Submitted(signature))
    }
}
