//! Session persistence.
//!
//! A `SessionStore` holds at most one `SessionState`, read and written
//! wholesale. In-memory state owned by the session is always the source of
//! truth; stores are best-effort durability and last write wins.
//!
//! - `MemorySessionStore`: process-local, for tests and embedding
//! - `FileSessionStore`: one file per session key, written atomically

mod error;
mod file;
mod memory;

use async_trait::async_trait;

use crate::core::SessionState;

pub use error::{Result, StoreError};
pub use file::{FileSessionStore, StoreFormat};
pub use memory::MemorySessionStore;

/// Storage for a single persisted session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session. `Ok(None)` means there is no prior session.
    async fn load(&self) -> Result<Option<SessionState>>;

    /// Replace the stored session. Implementations stamp `timestamp` on the
    /// persisted copy.
    async fn save(&self, state: &SessionState) -> Result<()>;

    /// Forget the stored session. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<()>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<Option<SessionState>> {
        (**self).load().await
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        (**self).save(state).await
    }

    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }
}
