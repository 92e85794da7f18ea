//! Remote ledger contract.
//!
//! The ledger is an opaque request/response service: it accepts signed
//! transactions for the four write instructions and answers two reads.
//! `TodoClient` is the typed call surface on top of it; `InMemoryLedger`
//! simulates the program in-process.

pub mod client;
pub mod error;
pub mod instruction;
pub mod memory;

use async_trait::async_trait;

use crate::address::Address;
use crate::models::{AccountFilter, ProgramAccount, TodoAccount, UserProfile};
use crate::wallet::Signature;

pub use client::TodoClient;
pub use error::{LedgerError, ProgramError};
pub use instruction::{InstructionAccounts, TodoInstruction, Transaction};
pub use memory::{InMemoryLedger, LedgerSnapshot};

#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Submit a signed transaction. Returns its signature once the ledger has
    /// applied it.
    async fn submit(&self, transaction: Transaction) -> Result<Signature, LedgerError>;

    /// Fetch the profile stored at `address`, `None` if no account exists there
    async fn fetch_profile(&self, address: &Address) -> Result<Option<UserProfile>, LedgerError>;

    /// List every todo account matching all `filters`
    async fn list_todos(
        &self,
        filters: &[AccountFilter],
    ) -> Result<Vec<ProgramAccount<TodoAccount>>, LedgerError>;
}
