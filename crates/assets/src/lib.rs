//! Filesystem blob storage for Folio cover images.
//!
//! Binary assets live outside the document store, in a single flat
//! directory. A stored asset is addressed by an opaque [`AssetRef`] that
//! round-trips through [`AssetStore::save`] and [`AssetStore::remove`];
//! callers never assume any particular path structure behind it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod store;

pub use store::AssetStore;

/// Errors surfaced by the asset store.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The handle does not name a file inside the store.
    #[error("invalid asset handle '{0}'")]
    InvalidHandle(String),

    #[error("asset store io failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Opaque handle to a stored asset.
///
/// Serializes as the asset's file name relative to the store root. Handles
/// are only minted by [`AssetStore::save`]; a handle read back from
/// persisted data is re-validated before any filesystem access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    pub(crate) fn new(name: String) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
