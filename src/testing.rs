//! In-memory ledger for unit tests.

use crate::dex::client::Ledger;
use crate::dex::keys::PoolKeys;
use crate::dex::state::tests::amm_account_bytes;
use crate::errors::{AppError, Result};
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::{Account as TokenAccount, AccountState};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Default)]
pub struct MockLedger {
    accounts: RefCell<HashMap<Pubkey, Account>>,
    sent: RefCell<Vec<Transaction>>,
    read_failure: RefCell<Option<String>>,
    /// Broadcasts succeed while fewer than this many were accepted.
    accept_limit: Cell<Option<usize>>,
}

pub fn token_account(mint: Pubkey, owner: Pubkey, amount: u64) -> Account {
    let state = TokenAccount {
        mint,
        owner,
        amount,
        state: AccountState::Initialized,
        ..TokenAccount::default()
    };
    let mut data = vec![0u8; TokenAccount::LEN];
    TokenAccount::pack(state, &mut data).expect("pack token account");
    Account {
        lamports: 2_039_280,
        data,
        owner: spl_token::ID,
        executable: false,
        rent_epoch: 0,
    }
}

impl MockLedger {
    pub fn with_pool(pool: &PoolKeys, base_reserve: u64, quote_reserve: u64) -> Self {
        let ledger = Self::default();
        ledger.insert(
            pool.id,
            Account {
                lamports: 1,
                data: amm_account_bytes((25, 10_000), (0, 0)),
                owner: pool.program_id,
                executable: false,
                rent_epoch: 0,
            },
        );
        ledger.insert(
            pool.base_vault,
            token_account(pool.base_mint, pool.authority, base_reserve),
        );
        ledger.insert(
            pool.quote_vault,
            token_account(pool.quote_mint, pool.authority, quote_reserve),
        );
        ledger
    }

    pub fn insert(&self, address: Pubkey, account: Account) {
        self.accounts.borrow_mut().insert(address, account);
    }

    pub fn remove_account(&self, address: &Pubkey) {
        self.accounts.borrow_mut().remove(address);
    }

    pub fn fail_reads(&self, reason: &str) {
        *self.read_failure.borrow_mut() = Some(reason.to_string());
    }

    pub fn accept_broadcasts(&self, limit: usize) {
        self.accept_limit.set(Some(limit));
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.borrow().clone()
    }
}

impl Ledger for MockLedger {
    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_unique())
    }

    async fn account(&self, address: &Pubkey) -> Result<Option<Account>> {
        if let Some(reason) = self.read_failure.borrow().as_ref() {
            return Err(AppError::Io(std::io::Error::other(reason.clone())));
        }
        Ok(self.accounts.borrow().get(address).cloned())
    }

    async fn broadcast(&self, tx: &Transaction) -> Result<Signature> {
        if let Some(limit) = self.accept_limit.get() {
            if self.sent.borrow().len() >= limit {
                return Err(AppError::Broadcast(
                    "Program log: Error: insufficient funds".into(),
                ));
            }
        }
        self.sent.borrow_mut().push(tx.clone());
        Ok(tx.signatures[0])
    }
}
