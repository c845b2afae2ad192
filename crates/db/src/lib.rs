//! In-process document store for Folio.
//!
//! The [`Database`] is an explicitly constructed handle with an explicit
//! lifecycle: opened once at startup, closed once at shutdown. Collections
//! created from a closed handle report [`DbError::Unavailable`] instead of
//! serving stale data.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod collection;
pub mod error;

pub use collection::Collection;
pub use error::DbError;

/// Shared handle to the document store.
#[derive(Debug, Clone)]
pub struct Database {
    open: Arc<AtomicBool>,
}

impl Database {
    /// Open a new database handle.
    pub fn open() -> Self {
        tracing::info!(target: "folio-db", "document store opened");
        Self {
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Close the handle. Subsequent collection operations fail with
    /// [`DbError::Unavailable`].
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        tracing::info!(target: "folio-db", "document store closed");
    }

    /// Whether the handle is still open.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Create a collection bound to this handle.
    pub fn collection<T: Clone>(&self) -> Collection<T> {
        Collection::new(self.clone())
    }

    pub(crate) fn ensure_open(&self) -> Result<(), DbError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DbError::Unavailable("database handle closed".to_string()))
        }
    }
}
