//! In-process ledger that executes the todo program's rules against raw
//! account bytes. Used by tests and by the REPL in place of a cluster.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::address::{profile_address, todo_address, Address};
use crate::ledger::instruction::{TodoInstruction, Transaction};
use crate::ledger::{LedgerError, LedgerService, ProgramError};
use crate::models::{AccountData, AccountFilter, ProgramAccount, TodoAccount, UserProfile};
use crate::wallet::{verify_signature, Signature};

/// Serializable copy of every account, hex-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub program_id: Address,
    pub accounts: BTreeMap<Address, String>,
}

#[derive(Debug, Default)]
struct LedgerInner {
    accounts: BTreeMap<Address, Vec<u8>>,
    transaction_count: u64,
    fail_next_submit: Option<String>,
}

#[derive(Debug)]
pub struct InMemoryLedger {
    program_id: Address,
    latency: Option<Duration>,
    inner: Mutex<LedgerInner>,
}

impl InMemoryLedger {
    pub fn new(program_id: Address) -> Self {
        Self {
            program_id,
            latency: None,
            inner: Mutex::new(LedgerInner::default()),
        }
    }

    /// Delay every request by `latency` before it is processed
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn program_id(&self) -> &Address {
        &self.program_id
    }

    /// Make the next `submit` fail with a transport error without touching state
    pub fn fail_next_submit(&self, reason: impl Into<String>) {
        self.inner.lock().fail_next_submit = Some(reason.into());
    }

    /// Number of transactions that reached the ledger, accepted or not
    pub fn transaction_count(&self) -> u64 {
        self.inner.lock().transaction_count
    }

    pub fn account_data(&self, address: &Address) -> Option<Vec<u8>> {
        self.inner.lock().accounts.get(address).cloned()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let inner = self.inner.lock();
        LedgerSnapshot {
            program_id: self.program_id,
            accounts: inner
                .accounts
                .iter()
                .map(|(address, data)| (*address, hex::encode(data)))
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        let mut accounts = BTreeMap::new();
        for (address, data) in snapshot.accounts {
            let bytes = hex::decode(&data).map_err(|e| {
                LedgerError::Transport(format!("corrupt snapshot entry {}: {}", address, e))
            })?;
            accounts.insert(address, bytes);
        }

        let ledger = Self::new(snapshot.program_id);
        ledger.inner.lock().accounts = accounts;
        Ok(ledger)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn execute(&self, inner: &mut LedgerInner, tx: &Transaction) -> Result<(), LedgerError> {
        if tx.program_id != self.program_id {
            return Err(LedgerError::WrongProgram(tx.program_id));
        }

        let authority = tx.accounts.authority;
        if !verify_signature(&authority, &tx.signed_message()?, &tx.signature) {
            return Err(LedgerError::InvalidSignature);
        }
        if tx.accounts.system_program != Address::default() {
            return Err(ProgramError::NotAllowed.into());
        }

        let expected_profile = profile_address(&authority, &self.program_id)?;
        if tx.accounts.user_profile != expected_profile {
            return Err(LedgerError::SeedsMismatch(tx.accounts.user_profile));
        }

        match &tx.instruction {
            TodoInstruction::InitializeUser => {
                if inner.accounts.contains_key(&expected_profile) {
                    return Err(LedgerError::AccountAlreadyInUse(expected_profile));
                }
                let data = allocate(&expected_profile, &UserProfile::new(authority))?;
                inner.accounts.insert(expected_profile, data);
            }
            TodoInstruction::AddTodo { content } => {
                let mut profile = load_profile(inner, &expected_profile, &authority)?;
                let todo_key = required_todo(tx)?;
                let expected_todo = todo_address(&authority, profile.last_todo, &self.program_id)?;
                if todo_key != expected_todo {
                    return Err(LedgerError::SeedsMismatch(todo_key));
                }
                if inner.accounts.contains_key(&todo_key) {
                    return Err(LedgerError::AccountAlreadyInUse(todo_key));
                }

                let todo = TodoAccount {
                    authority,
                    idx: profile.last_todo,
                    content: content.clone(),
                    marked: false,
                };
                profile.last_todo = profile
                    .last_todo
                    .checked_add(1)
                    .ok_or(ProgramError::MathOverflow)?;
                profile.todo_count = profile
                    .todo_count
                    .checked_add(1)
                    .ok_or(ProgramError::MathOverflow)?;

                let todo_data = allocate(&todo_key, &todo)?;
                let profile_data = allocate(&expected_profile, &profile)?;
                inner.accounts.insert(todo_key, todo_data);
                inner.accounts.insert(expected_profile, profile_data);
            }
            TodoInstruction::MarkTodo { todo_idx } => {
                load_profile(inner, &expected_profile, &authority)?;
                let todo_key = self.checked_todo_key(tx, &authority, *todo_idx)?;
                let mut todo = load_todo(inner, &todo_key, &authority)?;
                if todo.marked {
                    return Err(ProgramError::AlreadyMarked.into());
                }
                todo.marked = true;
                let data = allocate(&todo_key, &todo)?;
                inner.accounts.insert(todo_key, data);
            }
            TodoInstruction::RemoveTodo { todo_idx } => {
                let mut profile = load_profile(inner, &expected_profile, &authority)?;
                let todo_key = self.checked_todo_key(tx, &authority, *todo_idx)?;
                load_todo(inner, &todo_key, &authority)?;
                profile.todo_count = profile
                    .todo_count
                    .checked_sub(1)
                    .ok_or(ProgramError::MathOverflow)?;

                let profile_data = allocate(&expected_profile, &profile)?;
                inner.accounts.remove(&todo_key);
                inner.accounts.insert(expected_profile, profile_data);
            }
        }

        Ok(())
    }

    fn checked_todo_key(
        &self,
        tx: &Transaction,
        authority: &Address,
        todo_idx: u8,
    ) -> Result<Address, LedgerError> {
        let todo_key = required_todo(tx)?;
        if todo_key != todo_address(authority, todo_idx, &self.program_id)? {
            return Err(LedgerError::SeedsMismatch(todo_key));
        }
        Ok(todo_key)
    }
}

/// Encode `account` into a buffer of the program's fixed size, zero padded.
/// Fails like the program does when the encoding outgrows the allocation.
fn allocate<T: AccountData>(address: &Address, account: &T) -> Result<Vec<u8>, LedgerError> {
    let mut data = account.to_account_data()?;
    if data.len() > T::SPACE {
        return Err(LedgerError::AccountDidNotSerialize {
            address: *address,
            needed: data.len(),
            space: T::SPACE,
        });
    }
    data.resize(T::SPACE, 0);
    Ok(data)
}

fn required_todo(tx: &Transaction) -> Result<Address, LedgerError> {
    tx.accounts
        .todo_account
        .ok_or(LedgerError::MissingAccount("todo_account"))
}

fn load_profile(
    inner: &LedgerInner,
    address: &Address,
    authority: &Address,
) -> Result<UserProfile, LedgerError> {
    let data = inner
        .accounts
        .get(address)
        .ok_or(LedgerError::AccountNotFound(*address))?;
    let profile = UserProfile::from_account_data(data)?;
    if profile.authority != *authority {
        return Err(ProgramError::Unauthorized.into());
    }
    Ok(profile)
}

fn load_todo(
    inner: &LedgerInner,
    address: &Address,
    authority: &Address,
) -> Result<TodoAccount, LedgerError> {
    let data = inner
        .accounts
        .get(address)
        .ok_or(LedgerError::AccountNotFound(*address))?;
    let todo = TodoAccount::from_account_data(data)?;
    if todo.authority != *authority {
        return Err(ProgramError::Unauthorized.into());
    }
    Ok(todo)
}

#[async_trait]
impl LedgerService for InMemoryLedger {
    async fn submit(&self, transaction: Transaction) -> Result<Signature, LedgerError> {
        self.simulate_latency().await;

        let mut inner = self.inner.lock();
        inner.transaction_count += 1;
        if let Some(reason) = inner.fail_next_submit.take() {
            return Err(LedgerError::Transport(reason));
        }

        // Checks run before any write so a rejected transaction leaves no trace
        self.execute(&mut inner, &transaction)?;
        tracing::debug!(
            instruction = transaction.instruction.name(),
            signature = %transaction.signature,
            "transaction applied"
        );
        Ok(transaction.signature)
    }

    async fn fetch_profile(&self, address: &Address) -> Result<Option<UserProfile>, LedgerError> {
        self.simulate_latency().await;

        let inner = self.inner.lock();
        match inner.accounts.get(address) {
            Some(data) => Ok(Some(UserProfile::from_account_data(data)?)),
            None => Ok(None),
        }
    }

    async fn list_todos(
        &self,
        filters: &[AccountFilter],
    ) -> Result<Vec<ProgramAccount<TodoAccount>>, LedgerError> {
        self.simulate_latency().await;

        let inner = self.inner.lock();
        inner
            .accounts
            .iter()
            .filter(|(_, data)| TodoAccount::has_discriminator(data))
            .filter(|(_, data)| filters.iter().all(|filter| filter.matches(data)))
            .map(|(address, data)| {
                Ok(ProgramAccount::new(
                    *address,
                    TodoAccount::from_account_data(data)?,
                ))
            })
            .collect()
    }
}
