use parking_lot::Mutex;

use crate::session::state::TodoState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flag {
    Pending,
    Loading,
}

impl Flag {
    fn slot(self, state: &mut TodoState) -> &mut bool {
        match self {
            Flag::Pending => &mut state.pending,
            Flag::Loading => &mut state.loading,
        }
    }
}

/// Holds one of the session's busy flags and clears it on drop, so every exit
/// path of an operation (including a dropped future) releases it.
pub(crate) struct FlagGuard<'a> {
    state: &'a Mutex<TodoState>,
    flag: Flag,
}

impl<'a> FlagGuard<'a> {
    /// Set `flag` unless it is already set. `None` means someone else holds it.
    pub(crate) fn try_acquire(state: &'a Mutex<TodoState>, flag: Flag) -> Option<Self> {
        let mut guard = state.lock();
        let slot = flag.slot(&mut guard);
        if *slot {
            return None;
        }
        *slot = true;
        Some(Self { state, flag })
    }

    /// Set `flag` even if it is already held elsewhere
    pub(crate) fn acquire(state: &'a Mutex<TodoState>, flag: Flag) -> Self {
        *flag.slot(&mut state.lock()) = true;
        Self { state, flag }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        *self.flag.slot(&mut self.state.lock()) = false;
    }
}
