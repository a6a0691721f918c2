//! In-memory session store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Result, SessionStore, StoreError};
use crate::core::SessionState;

/// Session store backed by process memory.
///
/// Can be switched into a failing mode to exercise the durability-miss path
/// without touching the file system.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: RwLock<Option<SessionState>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemorySessionStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `state`.
    #[must_use]
    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
            ..Self::default()
        }
    }

    /// Make subsequent saves and clears fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Current contents without going through the async interface.
    pub fn snapshot(&self) -> Result<Option<SessionState>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.clone())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<SessionState>> {
        self.snapshot()
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        let mut current = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        *current = Some(state.stamped());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        let mut current = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        *current = None;
        Ok(())
    }
}
