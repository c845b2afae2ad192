use thiserror::Error;

/// Errors surfaced by the document store.
#[derive(Debug, Error)]
pub enum DbError {
    /// The store cannot serve the request, e.g. the handle was closed.
    #[error("datastore unavailable: {0}")]
    Unavailable(String),
}
