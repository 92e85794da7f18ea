use std::sync::Arc;
use std::time::Duration;

use todo_onchain_core::constants::notices;
use todo_onchain_core::models::{authority_filter, ProgramAccount, TodoAccount};
use todo_onchain_core::session::partition_todos;
use todo_onchain_core::{
    CoreConfig, InMemoryLedger, KeypairWallet, LedgerService, NoticeLevel, TodoClient,
    TodoSession,
};

fn setup_with_latency(latency: Option<Duration>) -> (Arc<InMemoryLedger>, TodoSession) {
    let config = CoreConfig::default();
    let mut ledger = InMemoryLedger::new(config.program_id);
    if let Some(latency) = latency {
        ledger = ledger.with_latency(latency);
    }
    let ledger = Arc::new(ledger);
    let wallet = Arc::new(KeypairWallet::generate());
    let client = TodoClient::new(ledger.clone(), wallet, &config);
    (ledger, TodoSession::new(client))
}

fn setup() -> (Arc<InMemoryLedger>, TodoSession) {
    setup_with_latency(None)
}

async fn initialized() -> (Arc<InMemoryLedger>, TodoSession) {
    let (ledger, session) = setup();
    session.identity_changed().await;
    assert!(session.initialize().await);
    session.drain_notices();
    (ledger, session)
}

async fn add(session: &TodoSession, content: &str) {
    session.set_draft(content);
    assert!(session.add_item().await, "add {:?} rejected", content);
}

fn find(items: &[ProgramAccount<TodoAccount>], content: &str) -> ProgramAccount<TodoAccount> {
    items
        .iter()
        .find(|item| item.account.content == content)
        .cloned()
        .unwrap_or_else(|| panic!("no todo with content {:?}", content))
}

async fn ledger_truth(
    ledger: &InMemoryLedger,
    session: &TodoSession,
) -> (Vec<ProgramAccount<TodoAccount>>, Vec<ProgramAccount<TodoAccount>>) {
    let owner = session.identity().unwrap();
    let mut todos = ledger.list_todos(&[authority_filter(&owner)]).await.unwrap();
    todos.sort_by_key(|todo| todo.account.idx);
    partition_todos(&todos)
}

#[tokio::test]
async fn test_connect_without_profile() {
    let (_ledger, session) = setup();
    session.identity_changed().await;

    let snapshot = session.snapshot();
    assert!(snapshot.identity.is_some());
    assert!(!snapshot.initialized);
    assert!(!snapshot.loading);
    assert!(snapshot.incomplete.is_empty());
    assert!(snapshot.complete.is_empty());
}

#[tokio::test]
async fn test_initialize_success() {
    let (_ledger, session) = setup();
    session.identity_changed().await;

    assert!(session.initialize().await);

    let snapshot = session.snapshot();
    assert!(snapshot.initialized);
    assert!(!snapshot.pending);
    assert!(snapshot.incomplete.is_empty());
    assert!(snapshot.complete.is_empty());

    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].message, notices::INITIALIZE_OK);
}

#[tokio::test]
async fn test_add_clears_draft_and_assigns_next_index() {
    let (_ledger, session) = initialized().await;

    add(&session, "buy milk").await;
    let first = session.snapshot();
    assert_eq!(first.draft, "");
    assert_eq!(first.incomplete.len(), 1);
    assert_eq!(first.incomplete[0].account.content, "buy milk");
    assert_eq!(first.incomplete[0].account.idx, 0);
    assert!(!first.incomplete[0].account.marked);

    add(&session, "walk dog").await;
    let second = session.snapshot();
    assert_eq!(second.incomplete.len(), 2);
    assert_eq!(find(&second.incomplete, "walk dog").account.idx, 1);
    assert_eq!(second.last_todo, 2);
}

#[tokio::test]
async fn test_empty_draft_is_ignored() {
    let (ledger, session) = initialized().await;
    let before = ledger.transaction_count();

    session.set_draft("");
    assert!(!session.add_item().await);

    assert_eq!(ledger.transaction_count(), before);
    assert!(session.drain_notices().is_empty());
}

#[tokio::test]
async fn test_rejected_add_keeps_draft() {
    let (ledger, session) = initialized().await;
    ledger.fail_next_submit("network failure");

    session.set_draft("buy milk");
    assert!(!session.add_item().await);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.draft, "buy milk");
    assert!(!snapshot.pending);
    assert!(snapshot.incomplete.is_empty());

    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, notices::ADD_FAILED);

    // Retrying the retained draft goes through
    assert!(session.add_item().await);
    assert_eq!(session.snapshot().incomplete.len(), 1);
}

#[tokio::test]
async fn test_add_disabled_until_profile_observed() {
    let (ledger, session) = setup();
    session.identity_changed().await;
    assert!(!session.snapshot().initialized);

    session.set_draft("too early");
    assert!(!session.add_item().await);

    assert_eq!(ledger.transaction_count(), 0);
    assert!(session.drain_notices().is_empty());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.draft, "too early");
    assert!(!snapshot.pending);
}

#[tokio::test]
async fn test_rejected_mark_records_one_notice() {
    let (ledger, session) = initialized().await;
    add(&session, "task").await;
    session.drain_notices();
    let before = session.snapshot();
    let todo = before.incomplete[0].clone();

    ledger.fail_next_submit("blockhash expired");
    assert!(!session.mark_item(todo.address, todo.account.idx).await);

    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, notices::MARK_FAILED);
    assert_eq!(session.snapshot(), before);
}

#[tokio::test]
async fn test_rejected_remove_records_one_notice() {
    let (ledger, session) = initialized().await;
    add(&session, "task").await;
    let todo = session.snapshot().incomplete[0].clone();
    assert!(session.mark_item(todo.address, todo.account.idx).await);
    session.drain_notices();
    let before = session.snapshot();

    ledger.fail_next_submit("blockhash expired");
    assert!(!session.remove_item(todo.address, todo.account.idx).await);

    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, notices::REMOVE_FAILED);
    let after = session.snapshot();
    assert_eq!(after, before);
    assert!(!after.pending);
    assert_eq!(after.complete.len(), 1);
}

#[tokio::test]
async fn test_duplicate_mark_from_stale_cache_is_rejected() {
    let config = CoreConfig::default();
    let ledger = Arc::new(InMemoryLedger::new(config.program_id));
    let wallet = Arc::new(KeypairWallet::generate());
    let first = TodoSession::new(TodoClient::new(ledger.clone(), wallet.clone(), &config));
    let second = TodoSession::new(TodoClient::new(ledger.clone(), wallet, &config));

    assert!(first.initialize().await);
    add(&first, "shared").await;
    second.identity_changed().await;
    let todo = second.snapshot().incomplete[0].clone();

    assert!(first.mark_item(todo.address, todo.account.idx).await);
    // `second` still holds the item as open
    assert!(!second.mark_item(todo.address, todo.account.idx).await);

    let notices = second.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, notices::MARK_FAILED);
    assert_eq!(
        notices[0].detail.as_deref(),
        Some("program error 6003: Already marked")
    );

    let snapshot = second.snapshot();
    assert!(!snapshot.pending);
    let (incomplete, complete) = ledger_truth(&ledger, &second).await;
    assert_eq!(snapshot.incomplete, incomplete);
    assert_eq!(snapshot.complete, complete);
    assert_eq!(snapshot.complete.len(), 1);
}

#[tokio::test]
async fn test_oversized_draft_is_rejected_and_kept() {
    let (_ledger, session) = initialized().await;
    let long = "x".repeat(200);

    session.set_draft(long.clone());
    assert!(!session.add_item().await);

    assert_eq!(session.snapshot().draft, long);
    assert!(session.snapshot().incomplete.is_empty());
    assert_eq!(session.drain_notices()[0].message, notices::ADD_FAILED);
}

#[tokio::test]
async fn test_mark_complete_item_makes_no_call() {
    let (ledger, session) = initialized().await;
    add(&session, "task").await;
    let todo = session.snapshot().incomplete[0].clone();
    assert!(session.mark_item(todo.address, todo.account.idx).await);
    session.drain_notices();

    let before_count = ledger.transaction_count();
    let before = session.snapshot();
    assert!(!session.mark_item(todo.address, todo.account.idx).await);

    assert_eq!(ledger.transaction_count(), before_count);
    assert_eq!(session.snapshot(), before);
    assert!(session.drain_notices().is_empty());
}

#[tokio::test]
async fn test_remove_requires_complete_item() {
    let (ledger, session) = initialized().await;
    add(&session, "task").await;
    let todo = session.snapshot().incomplete[0].clone();
    let before = ledger.transaction_count();

    assert!(!session.remove_item(todo.address, todo.account.idx).await);
    assert_eq!(ledger.transaction_count(), before);

    assert!(session.mark_item(todo.address, todo.account.idx).await);
    assert!(session.remove_item(todo.address, todo.account.idx).await);

    let snapshot = session.snapshot();
    assert!(snapshot.incomplete.is_empty());
    assert!(snapshot.complete.is_empty());
    // Indices are never reused
    assert_eq!(snapshot.last_todo, 1);
}

#[tokio::test]
async fn test_unknown_item_is_ignored() {
    let (ledger, session) = initialized().await;
    add(&session, "task").await;
    let todo = session.snapshot().incomplete[0].clone();
    let before = ledger.transaction_count();

    assert!(!session.mark_item(todo.address, todo.account.idx + 1).await);
    assert_eq!(ledger.transaction_count(), before);
}

#[tokio::test]
async fn test_serial_writes_match_ledger_partition() {
    let (ledger, session) = initialized().await;

    for content in ["a", "b", "c", "d", "e"] {
        add(&session, content).await;
    }

    let snapshot = session.snapshot();
    for content in ["a", "c", "d"] {
        let todo = find(&snapshot.incomplete, content);
        assert!(session.mark_item(todo.address, todo.account.idx).await);
    }
    let snapshot = session.snapshot();
    let todo = find(&snapshot.complete, "c");
    assert!(session.remove_item(todo.address, todo.account.idx).await);
    add(&session, "f").await;

    session.refresh().await;
    let snapshot = session.snapshot();
    let (incomplete, complete) = ledger_truth(&ledger, &session).await;
    assert_eq!(snapshot.incomplete, incomplete);
    assert_eq!(snapshot.complete, complete);

    let names = |items: &[ProgramAccount<TodoAccount>]| {
        items
            .iter()
            .map(|item| item.account.content.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&snapshot.incomplete), vec!["b", "e", "f"]);
    assert_eq!(names(&snapshot.complete), vec!["a", "d"]);
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let (_ledger, session) = initialized().await;
    add(&session, "one").await;
    add(&session, "two").await;

    session.refresh().await;
    let first = session.snapshot();
    session.refresh().await;
    let second = session.snapshot();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_write_is_dropped() {
    let (ledger, session) = setup_with_latency(Some(Duration::from_millis(100)));
    session.identity_changed().await;
    assert!(session.initialize().await);
    session.drain_notices();
    let before = ledger.transaction_count();

    session.set_draft("only once");
    let observe_pending = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        session.snapshot().pending
    };
    let (first, second, pending_mid_flight) =
        tokio::join!(session.add_item(), session.add_item(), observe_pending);

    assert!(first);
    assert!(!second);
    assert!(pending_mid_flight);
    assert!(!session.snapshot().pending);
    assert_eq!(ledger.transaction_count(), before + 1);
    assert_eq!(session.snapshot().incomplete.len(), 1);
    assert_eq!(session.drain_notices().len(), 1);
}

#[tokio::test]
async fn test_pending_released_when_write_future_dropped() {
    let (ledger, session) = setup_with_latency(Some(Duration::from_millis(200)));

    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), session.initialize()).await;
    assert!(timed_out.is_err());
    assert!(!session.snapshot().pending);
    assert_eq!(ledger.transaction_count(), 0);
}

#[tokio::test]
async fn test_identities_see_only_their_own_items() {
    let config = CoreConfig::default();
    let ledger = Arc::new(InMemoryLedger::new(config.program_id));
    let alice = TodoSession::new(TodoClient::new(
        ledger.clone(),
        Arc::new(KeypairWallet::generate()),
        &config,
    ));
    let bob = TodoSession::new(TodoClient::new(
        ledger.clone(),
        Arc::new(KeypairWallet::generate()),
        &config,
    ));

    assert!(alice.initialize().await);
    assert!(bob.initialize().await);
    add(&alice, "alice's task").await;
    add(&bob, "bob's task").await;

    let alice_view = alice.snapshot();
    assert_eq!(alice_view.incomplete.len(), 1);
    assert_eq!(alice_view.incomplete[0].account.content, "alice's task");

    // Switching bob's session to a fresh wallet drops his cached items
    bob.connect(Arc::new(KeypairWallet::generate())).await;
    let bob_view = bob.snapshot();
    assert!(!bob_view.initialized);
    assert!(bob_view.incomplete.is_empty());
}
