//! Account storage with email uniqueness.

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use folio_auth::Role;
use folio_db::{Collection, Database, DbError};

use super::models::User;

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Db(#[from] DbError),
}

/// User accounts, indexed by store-assigned id and unique email.
#[derive(Debug, Clone)]
pub struct UserStore {
    users: Collection<User>,
}

impl UserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(),
        }
    }

    /// Create an account. The email is expected to be normalized
    /// (trimmed, lowercased) by the caller.
    pub fn create(
        &self,
        name: String,
        email: String,
        password_hash: String,
        role: Role,
    ) -> Result<User, UserStoreError> {
        if self.find_by_email(&email)?.is_some() {
            return Err(UserStoreError::DuplicateEmail);
        }

        let user = self.users.insert_with(|id| User {
            id,
            name,
            email,
            password_hash,
            role,
            created_at: OffsetDateTime::now_utc(),
        })?;

        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        self.users.find(|user| user.email == email)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<User>, DbError> {
        self.users.get(&id)
    }
}
