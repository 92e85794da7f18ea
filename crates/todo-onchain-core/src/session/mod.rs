//! Todo session: the state and action surface presentation code talks to.
//!
//! A session bridges the connected wallet and the ledger. It caches the
//! user's profile flag and todo list, sequences the four writes behind a
//! single-flight `pending` flag, and refreshes from the ledger after every
//! write settles. Write failures never propagate to the caller; they end up
//! as a `Notice` and a log line.

mod guard;
pub mod state;

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::address::{profile_address, todo_address, Address};
use crate::constants::notices;
use crate::ledger::{LedgerError, TodoClient};
use crate::models::{ProgramAccount, TodoAccount, UserProfile};
use crate::wallet::{DisconnectedWallet, Signature, Wallet};

use guard::{Flag, FlagGuard};

pub use state::{partition_todos, Notice, NoticeLevel, TodoSnapshot, TodoState, MAX_NOTICES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Initialize,
    Add,
    Mark,
    Remove,
}

impl WriteKind {
    fn name(self) -> &'static str {
        match self {
            WriteKind::Initialize => "initialize_user",
            WriteKind::Add => "add_todo",
            WriteKind::Mark => "mark_todo",
            WriteKind::Remove => "remove_todo",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            WriteKind::Initialize => notices::INITIALIZE_OK,
            WriteKind::Add => notices::ADD_OK,
            WriteKind::Mark => notices::MARK_OK,
            WriteKind::Remove => notices::REMOVE_OK,
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            WriteKind::Initialize => notices::INITIALIZE_FAILED,
            WriteKind::Add => notices::ADD_FAILED,
            WriteKind::Mark => notices::MARK_FAILED,
            WriteKind::Remove => notices::REMOVE_FAILED,
        }
    }
}

type RemoteState = Option<(UserProfile, Vec<ProgramAccount<TodoAccount>>)>;

pub struct TodoSession {
    client: TodoClient,
    state: Mutex<TodoState>,
}

impl TodoSession {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            state: Mutex::new(TodoState::default()),
        }
    }

    pub fn identity(&self) -> Option<Address> {
        self.client.identity()
    }

    pub fn snapshot(&self) -> TodoSnapshot {
        let identity = self.identity();
        TodoSnapshot::from_state(identity, &self.state.lock())
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.state.lock().draft = text.into();
    }

    /// Take all notices recorded since the last call. Only the latest
    /// `MAX_NOTICES` are kept between calls.
    pub fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.lock().notices)
    }

    // ===== Identity =====

    pub async fn connect(&self, wallet: Arc<dyn Wallet>) {
        self.client.set_wallet(wallet);
        self.identity_changed().await;
    }

    pub async fn disconnect(&self) {
        self.client.set_wallet(Arc::new(DisconnectedWallet));
        self.identity_changed().await;
    }

    /// Drop everything cached for the previous identity and reload
    pub async fn identity_changed(&self) {
        self.state.lock().reset_remote();
        self.refresh().await;
    }

    // ===== Writes =====

    /// Create the profile account for the connected identity
    pub async fn initialize(&self) -> bool {
        let Some(identity) = self.connected_identity() else {
            return false;
        };

        let write = async {
            let profile = profile_address(&identity, self.client.program_id())?;
            self.client.initialize_user(profile).await
        };
        self.run_write(WriteKind::Initialize, write, |state| {
            state.initialized = true;
        })
        .await
    }

    /// Add the current draft as a new todo. Disabled until a profile has been
    /// observed. The draft is cleared only on success.
    pub async fn add_item(&self) -> bool {
        let Some(identity) = self.connected_identity() else {
            return false;
        };
        let (initialized, content, last_todo) = {
            let state = self.state.lock();
            (state.initialized, state.draft.clone(), state.last_todo)
        };
        if !initialized {
            tracing::debug!("no profile observed yet, add disabled");
            return false;
        }
        if content.is_empty() {
            tracing::debug!("empty draft, nothing to add");
            return false;
        }

        let write = async {
            let program_id = self.client.program_id();
            let profile = profile_address(&identity, program_id)?;
            let todo = todo_address(&identity, last_todo, program_id)?;
            self.client.add_todo(profile, todo, &content).await
        };
        self.run_write(WriteKind::Add, write, |state| state.draft.clear())
            .await
    }

    /// Mark a cached, still incomplete todo as done
    pub async fn mark_item(&self, todo: Address, idx: u8) -> bool {
        let Some(identity) = self.connected_identity() else {
            return false;
        };
        if !self.cached_with_marked(&todo, idx, false) {
            tracing::debug!(%todo, idx, "mark skipped, todo not open in cache");
            return false;
        }

        let write = async {
            let profile = profile_address(&identity, self.client.program_id())?;
            self.client.mark_todo(profile, todo, idx).await
        };
        self.run_write(WriteKind::Mark, write, |_| {}).await
    }

    /// Remove a cached todo that has already been marked
    pub async fn remove_item(&self, todo: Address, idx: u8) -> bool {
        let Some(identity) = self.connected_identity() else {
            return false;
        };
        if !self.cached_with_marked(&todo, idx, true) {
            tracing::debug!(%todo, idx, "remove skipped, todo not complete in cache");
            return false;
        }

        let write = async {
            let profile = profile_address(&identity, self.client.program_id())?;
            self.client.remove_todo(profile, todo, idx).await
        };
        self.run_write(WriteKind::Remove, write, |_| {}).await
    }

    // ===== Reads =====

    /// Reload profile and todos for the connected identity, replacing the cache.
    ///
    /// Overlapping refreshes are not ordered: whichever response resolves last
    /// is what the cache ends up holding.
    pub async fn refresh(&self) {
        let Some(identity) = self.identity() else {
            self.state.lock().reset_remote();
            return;
        };

        let _loading = FlagGuard::acquire(&self.state, Flag::Loading);
        let fetched = self.fetch_remote(&identity).await;

        let mut state = self.state.lock();
        match fetched {
            Ok(Some((profile, todos))) => {
                state.initialized = true;
                state.last_todo = profile.last_todo;
                state.replace_todos(todos);
            }
            Ok(None) => state.reset_remote(),
            Err(e) => {
                tracing::warn!(error = %e, %identity, "refresh failed");
                state.reset_remote();
            }
        }
    }

    async fn fetch_remote(&self, identity: &Address) -> Result<RemoteState, LedgerError> {
        let profile_key = profile_address(identity, self.client.program_id())?;
        let Some(profile) = self.client.fetch_profile(&profile_key).await? else {
            return Ok(None);
        };
        let todos = self.client.todos_by_owner(identity).await?;
        Ok(Some((profile, todos)))
    }

    // ===== Helpers =====

    fn connected_identity(&self) -> Option<Address> {
        let identity = self.identity();
        if identity.is_none() {
            tracing::debug!("no wallet connected, ignoring action");
        }
        identity
    }

    fn cached_with_marked(&self, todo: &Address, idx: u8, marked: bool) -> bool {
        self.state
            .lock()
            .find_todo(todo, idx)
            .map(|cached| cached.account.marked == marked)
            .unwrap_or(false)
    }

    /// Run one write under the single-flight flag. Returns whether the ledger
    /// accepted it; `false` also covers a write dropped because another one
    /// was still in flight.
    async fn run_write<F>(
        &self,
        kind: WriteKind,
        write: F,
        on_success: impl FnOnce(&mut TodoState),
    ) -> bool
    where
        F: Future<Output = Result<Signature, LedgerError>>,
    {
        let Some(pending) = FlagGuard::try_acquire(&self.state, Flag::Pending) else {
            tracing::debug!(operation = kind.name(), "write already in flight, dropping");
            return false;
        };

        let result = write.await;
        let accepted = {
            let mut state = self.state.lock();
            match result {
                Ok(signature) => {
                    tracing::info!(operation = kind.name(), %signature, "write confirmed");
                    on_success(&mut state);
                    state.push_notice(Notice::success(kind.success_message()));
                    true
                }
                Err(e) => {
                    tracing::warn!(operation = kind.name(), error = %e, "write failed");
                    state.push_notice(
                        Notice::error(kind.failure_message()).with_detail(e.to_string()),
                    );
                    false
                }
            }
        };
        drop(pending);

        self.refresh().await;
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::ledger::InMemoryLedger;
    use crate::wallet::KeypairWallet;

    fn session_with(ledger: Arc<InMemoryLedger>, wallet: Arc<dyn Wallet>) -> TodoSession {
        let config = CoreConfig::default();
        TodoSession::new(TodoClient::new(ledger, wallet, &config))
    }

    #[tokio::test]
    async fn test_disconnected_actions_are_silent() {
        let ledger = Arc::new(InMemoryLedger::new(CoreConfig::default().program_id));
        let session = session_with(ledger.clone(), Arc::new(DisconnectedWallet));
        session.set_draft("buy milk");

        assert!(!session.initialize().await);
        assert!(!session.add_item().await);
        assert_eq!(ledger.transaction_count(), 0);
        assert!(session.drain_notices().is_empty());
        assert_eq!(session.snapshot().draft, "buy milk");
    }

    #[tokio::test]
    async fn test_initialize_failure_records_notice_with_detail() {
        let ledger = Arc::new(InMemoryLedger::new(CoreConfig::default().program_id));
        let session = session_with(ledger.clone(), Arc::new(KeypairWallet::generate()));
        ledger.fail_next_submit("cluster unreachable");

        assert!(!session.initialize().await);

        let snapshot = session.snapshot();
        assert!(!snapshot.initialized);
        assert!(!snapshot.pending);
        let notices = session.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, notices::INITIALIZE_FAILED);
        assert_eq!(
            notices[0].detail.as_deref(),
            Some("transport error: cluster unreachable")
        );
    }

    #[tokio::test]
    async fn test_drain_clears_notices() {
        let ledger = Arc::new(InMemoryLedger::new(CoreConfig::default().program_id));
        let session = session_with(ledger, Arc::new(KeypairWallet::generate()));
        assert!(session.initialize().await);
        assert_eq!(session.drain_notices().len(), 1);
        assert!(session.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_clears_cache() {
        let ledger = Arc::new(InMemoryLedger::new(CoreConfig::default().program_id));
        let session = session_with(ledger, Arc::new(KeypairWallet::generate()));
        session.initialize().await;
        session.set_draft("task");
        session.add_item().await;
        assert_eq!(session.snapshot().incomplete.len(), 1);

        session.disconnect().await;
        let snapshot = session.snapshot();
        assert!(snapshot.identity.is_none());
        assert!(!snapshot.initialized);
        assert!(snapshot.incomplete.is_empty());
    }
}
