//! Shared state for the page handlers and per-session locking.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use quizgrade_core::flow::FlowController;
use quizgrade_core::session::{SessionId, SessionStore};

pub(crate) struct AppState {
    pub(crate) flow: FlowController,
    pub(crate) sessions: Arc<dyn SessionStore>,
    pub(crate) locks: SessionLocks,
}

/// One async mutex per session with a request in flight.
#[derive(Default)]
pub(crate) struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id` until the guard is dropped.
    pub(crate) async fn acquire(&self, id: SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries only the map still references are idle.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
