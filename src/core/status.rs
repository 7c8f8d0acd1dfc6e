//! Process-wide sync status
//!
//! One observable value owned by the sync engine (the only writer).
//! Lifecycle: `idle → syncing → {synced | error}`, with `synced`/`error`
//! returning to `syncing` on the next operation. `offline` is entered
//! once at startup when the remote is disabled and is terminal for the
//! process lifetime.

use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Current state of remote synchronization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase", tag = "state", content = "message")]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
    Synced,
    Error(String),
    Offline,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncState::Idle => write!(f, "idle"),
            SyncState::Syncing => write!(f, "syncing"),
            SyncState::Synced => write!(f, "synced"),
            SyncState::Error(msg) => write!(f, "error: {}", msg),
            SyncState::Offline => write!(f, "offline"),
        }
    }
}

type Subscriber = Box<dyn Fn(&SyncState) + Send>;

struct Inner {
    state: Mutex<SyncState>,
    subscribers: Mutex<Vec<Subscriber>>,
}

/// Shared handle to the sync status observable.
///
/// Cloning shares the underlying cell; readers subscribe or poll, and
/// only the sync engine transitions the value.
#[derive(Clone)]
pub struct SyncStatusCell {
    inner: Arc<Inner>,
}

impl Default for SyncStatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncStatusCell {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SyncState::Idle),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The current state
    pub fn get(&self) -> SyncState {
        self.inner
            .state
            .lock()
            .map(|s| s.clone())
            .unwrap_or(SyncState::Idle)
    }

    /// Register a callback invoked on every transition
    pub fn subscribe<F: Fn(&SyncState) + Send + 'static>(&self, f: F) {
        if let Ok(mut subs) = self.inner.subscribers.lock() {
            subs.push(Box::new(f));
        }
    }

    pub(crate) fn set_syncing(&self) {
        self.transition(SyncState::Syncing);
    }

    pub(crate) fn set_synced(&self) {
        self.transition(SyncState::Synced);
    }

    pub(crate) fn set_error(&self, message: impl Into<String>) {
        self.transition(SyncState::Error(message.into()));
    }

    pub(crate) fn set_offline(&self) {
        self.transition(SyncState::Offline);
    }

    fn transition(&self, next: SyncState) {
        {
            let Ok(mut state) = self.inner.state.lock() else {
                return;
            };
            // Offline is terminal until the process restarts with a remote
            if *state == SyncState::Offline && next != SyncState::Offline {
                return;
            }
            if *state == next {
                return;
            }
            *state = next.clone();
        }
        if let Ok(subs) = self.inner.subscribers.lock() {
            for sub in subs.iter() {
                sub(&next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn transitions_follow_the_lifecycle() {
        let cell = SyncStatusCell::new();
        assert_eq!(cell.get(), SyncState::Idle);

        cell.set_syncing();
        assert_eq!(cell.get(), SyncState::Syncing);
        cell.set_synced();
        assert_eq!(cell.get(), SyncState::Synced);

        // Next operation goes back through syncing, not idle
        cell.set_syncing();
        cell.set_error("boom");
        assert_eq!(cell.get(), SyncState::Error("boom".into()));
    }

    #[test]
    fn offline_is_terminal() {
        let cell = SyncStatusCell::new();
        cell.set_offline();
        cell.set_syncing();
        cell.set_synced();
        assert_eq!(cell.get(), SyncState::Offline);
    }

    #[test]
    fn subscribers_see_every_transition() {
        let cell = SyncStatusCell::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        cell.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        cell.set_syncing();
        cell.set_synced();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
