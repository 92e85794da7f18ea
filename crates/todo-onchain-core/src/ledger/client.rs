use std::sync::Arc;

use parking_lot::RwLock;

use crate::address::Address;
use crate::config::CoreConfig;
use crate::ledger::instruction::{InstructionAccounts, TodoInstruction, Transaction};
use crate::ledger::{LedgerError, LedgerService};
use crate::models::{authority_filter, ProgramAccount, TodoAccount, UserProfile};
use crate::wallet::{Signature, Wallet, WalletError};

/// Typed calls against the todo program: builds the instruction, has the
/// connected wallet sign it and submits it to the ledger.
pub struct TodoClient {
    ledger: Arc<dyn LedgerService>,
    wallet: RwLock<Arc<dyn Wallet>>,
    program_id: Address,
}

impl TodoClient {
    pub fn new(ledger: Arc<dyn LedgerService>, wallet: Arc<dyn Wallet>, config: &CoreConfig) -> Self {
        Self {
            ledger,
            wallet: RwLock::new(wallet),
            program_id: config.program_id,
        }
    }

    pub fn program_id(&self) -> &Address {
        &self.program_id
    }

    pub fn identity(&self) -> Option<Address> {
        self.wallet.read().address()
    }

    pub fn set_wallet(&self, wallet: Arc<dyn Wallet>) {
        *self.wallet.write() = wallet;
    }

    pub async fn initialize_user(&self, user_profile: Address) -> Result<Signature, LedgerError> {
        self.send(TodoInstruction::InitializeUser, user_profile, None)
            .await
    }

    pub async fn add_todo(
        &self,
        user_profile: Address,
        todo_account: Address,
        content: &str,
    ) -> Result<Signature, LedgerError> {
        let instruction = TodoInstruction::AddTodo {
            content: content.to_string(),
        };
        self.send(instruction, user_profile, Some(todo_account)).await
    }

    pub async fn mark_todo(
        &self,
        user_profile: Address,
        todo_account: Address,
        todo_idx: u8,
    ) -> Result<Signature, LedgerError> {
        self.send(
            TodoInstruction::MarkTodo { todo_idx },
            user_profile,
            Some(todo_account),
        )
        .await
    }

    pub async fn remove_todo(
        &self,
        user_profile: Address,
        todo_account: Address,
        todo_idx: u8,
    ) -> Result<Signature, LedgerError> {
        self.send(
            TodoInstruction::RemoveTodo { todo_idx },
            user_profile,
            Some(todo_account),
        )
        .await
    }

    pub async fn fetch_profile(&self, address: &Address) -> Result<Option<UserProfile>, LedgerError> {
        self.ledger.fetch_profile(address).await
    }

    /// All todos whose authority is `owner`
    pub async fn todos_by_owner(
        &self,
        owner: &Address,
    ) -> Result<Vec<ProgramAccount<TodoAccount>>, LedgerError> {
        self.ledger.list_todos(&[authority_filter(owner)]).await
    }

    async fn send(
        &self,
        instruction: TodoInstruction,
        user_profile: Address,
        todo_account: Option<Address>,
    ) -> Result<Signature, LedgerError> {
        // Sign up front so the wallet lock is released before awaiting the ledger
        let transaction = {
            let wallet = self.wallet.read().clone();
            let authority = wallet.address().ok_or(WalletError::NotConnected)?;
            let accounts = InstructionAccounts::new(authority, user_profile, todo_account);
            Transaction::sign(wallet.as_ref(), self.program_id, instruction, accounts)?
        };
        self.ledger.submit(transaction).await
    }
}
