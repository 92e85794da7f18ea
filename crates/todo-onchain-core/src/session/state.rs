use serde::Serialize;

use crate::address::Address;
use crate::models::{ProgramAccount, TodoAccount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient, user-visible outcome of a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            detail: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Notices kept while presentation code is not draining them. Older ones are
/// dropped first.
pub const MAX_NOTICES: usize = 32;

/// Client-side view state owned by a `TodoSession`.
///
/// `todos` is only ever replaced wholesale by a refresh; the complete and
/// incomplete views are projected from it on demand.
#[derive(Debug, Clone, Default)]
pub struct TodoState {
    pub initialized: bool,
    pub loading: bool,
    pub pending: bool,
    pub draft: String,
    pub last_todo: u8,
    pub todos: Vec<ProgramAccount<TodoAccount>>,
    pub notices: Vec<Notice>,
}

impl TodoState {
    pub fn find_todo(&self, address: &Address, idx: u8) -> Option<&ProgramAccount<TodoAccount>> {
        self.todos
            .iter()
            .find(|todo| todo.address == *address && todo.account.idx == idx)
    }

    pub(crate) fn replace_todos(&mut self, mut todos: Vec<ProgramAccount<TodoAccount>>) {
        todos.sort_by_key(|todo| todo.account.idx);
        self.todos = todos;
    }

    pub(crate) fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() >= MAX_NOTICES {
            self.notices.remove(0);
        }
        self.notices.push(notice);
    }

    /// Forget everything learned from the ledger. The draft is user input and stays.
    pub(crate) fn reset_remote(&mut self) {
        self.initialized = false;
        self.last_todo = 0;
        self.todos.clear();
    }
}

/// Split todos into (incomplete, complete), preserving order
pub fn partition_todos(
    todos: &[ProgramAccount<TodoAccount>],
) -> (Vec<ProgramAccount<TodoAccount>>, Vec<ProgramAccount<TodoAccount>>) {
    let (complete, incomplete): (Vec<_>, Vec<_>) =
        todos.iter().cloned().partition(|todo| todo.account.marked);
    (incomplete, complete)
}

/// Everything presentation code needs to render the todo list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoSnapshot {
    pub identity: Option<Address>,
    pub initialized: bool,
    pub loading: bool,
    pub pending: bool,
    pub draft: String,
    pub last_todo: u8,
    pub incomplete: Vec<ProgramAccount<TodoAccount>>,
    pub complete: Vec<ProgramAccount<TodoAccount>>,
}

impl TodoSnapshot {
    pub(crate) fn from_state(identity: Option<Address>, state: &TodoState) -> Self {
        let (incomplete, complete) = partition_todos(&state.todos);
        Self {
            identity,
            initialized: state.initialized,
            loading: state.loading,
            pending: state.pending,
            draft: state.draft.clone(),
            last_todo: state.last_todo,
            incomplete,
            complete,
        }
    }
}
