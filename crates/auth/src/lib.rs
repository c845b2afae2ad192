//! Credential primitives for Folio: argon2id password hashing, opaque
//! bearer session tokens with expiry, and the role model the access gate
//! decides on.

use thiserror::Error;

pub mod password;
pub mod role;
pub mod session;

pub use password::{hash_password, verify_password};
pub use role::Role;
pub use session::{Session, SessionStore};

/// Errors surfaced by the credential primitives.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("role must be either user or admin")]
    InvalidRole,
}
