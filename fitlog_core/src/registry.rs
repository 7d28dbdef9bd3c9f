//! User registry: creates users and enforces username uniqueness.
//!
//! The uniqueness check is a lookup followed by a create. Two identical
//! requests racing between those steps are only caught when the store
//! itself rejects the second insert, as [`crate::JsonFileStore`] and
//! [`crate::MemoryStore`] do. A store without that check can end up with
//! duplicate usernames under concurrent writers.

use crate::{Error, NewUser, RecordStore, Result, User, UserSummary};

/// Creates and lists users
pub struct UserRegistry<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> UserRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Create a user with an empty log
    pub fn create_user(&self, username: &str) -> Result<UserSummary> {
        if username.trim().is_empty() {
            tracing::warn!("Rejected blank username");
            return Err(Error::InvalidUsername(username.to_string()));
        }

        if self.store.find_by_username(username)?.is_some() {
            tracing::info!("Username {:?} already taken", username);
            return Err(Error::DuplicateUsername(username.to_string()));
        }

        let user = self
            .store
            .create(NewUser {
                username: username.to_string(),
            })
            .map_err(|e| match e {
                Error::UniqueViolation(name) => Error::DuplicateUsername(name),
                other => other,
            })?;

        tracing::info!("Created user {} ({})", user.username, user.id);
        Ok(user.summary())
    }

    /// All users, full records, in creation order
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.store.all()
    }
}
