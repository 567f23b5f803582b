use crate::dex::keys::PoolKeys;
use crate::dex::state::{PoolReserveSnapshot, decode_amm_account, decode_vault_amount};
use crate::errors::{AppError, Result};
use crate::utils::surface_failure_reason;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use tracing::debug;

/// The slice of the chain the bot talks to.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// `Ok(None)` when the address holds no account.
    async fn account(&self, address: &Pubkey) -> Result<Option<Account>>;

    /// Single best-effort send; does not wait for confirmation.
    async fn broadcast(&self, tx: &Transaction) -> Result<Signature>;
}

/// `Ledger` backed by a Solana JSON-RPC node.
pub struct RpcLedger {
    rpc: RpcClient,
}

impl RpcLedger {
    pub fn new(rpc_url: &str) -> Self {
        let rpc = RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed());
        Self { rpc }
    }
}

impl Ledger for RpcLedger {
    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    async fn account(&self, address: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await?;
        Ok(response.value)
    }

    async fn broadcast(&self, tx: &Transaction) -> Result<Signature> {
        self.rpc
            .send_transaction(tx)
            .await
            .map_err(|e| AppError::Broadcast(broadcast_failure_reason(&e)))
    }
}

/// Prefer the program log line that explains a rejected send.
fn broadcast_failure_reason(err: &ClientError) -> String {
    if let ClientErrorKind::RpcError(RpcError::RpcResponseError {
        data: RpcResponseErrorData::SendTransactionPreflightFailure(sim),
        ..
    }) = err.kind()
    {
        if let Some(logs) = &sim.logs {
            return surface_failure_reason(logs, &err.to_string());
        }
    }
    err.to_string()
}

/// Read the pool's reserves: AMM account plus both vaults.
pub async fn fetch_reserves<L: Ledger>(ledger: &L, pool: &PoolKeys) -> Result<PoolReserveSnapshot> {
    let amm = required_account(ledger, &pool.id).await?;
    let base_vault = required_account(ledger, &pool.base_vault).await?;
    let quote_vault = required_account(ledger, &pool.quote_vault).await?;

    let amm = decode_amm_account(&amm.data)?;
    let snapshot = PoolReserveSnapshot::from_accounts(
        &amm,
        decode_vault_amount(&base_vault.data)?,
        decode_vault_amount(&quote_vault.data)?,
    );
    debug!(
        base_reserve = snapshot.base_reserve,
        quote_reserve = snapshot.quote_reserve,
        "[DEX] reserves fetched"
    );
    Ok(snapshot)
}

async fn required_account<L: Ledger>(ledger: &L, address: &Pubkey) -> Result<Account> {
    ledger
        .account(address)
        .await
        .map_err(AppError::into_quote)?
        .ok_or_else(|| AppError::Quote(format!("account {address} not found")))
}
