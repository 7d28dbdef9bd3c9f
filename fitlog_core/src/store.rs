//! Record store abstraction.
//!
//! The registry and both log engines only talk to storage through
//! [`RecordStore`]. Each call is atomic for the single record it touches.

use crate::{Error, NewUser, Result, User, UserId};
use std::sync::{Mutex, MutexGuard};

/// Durable record store for users and their logs
pub trait RecordStore {
    /// Look up a user by id
    fn find_by_key(&self, id: &UserId) -> Result<Option<User>>;

    /// Look up a user by exact, case-sensitive username
    fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert a new user with an empty log, assigning its id
    ///
    /// Implementations that can check uniqueness atomically return
    /// [`Error::UniqueViolation`] for a taken username.
    fn create(&self, new_user: NewUser) -> Result<User>;

    /// Persist the full record, replacing the stored one with the same id
    fn save(&self, user: &User) -> Result<User>;

    /// All users in creation order
    fn all(&self) -> Result<Vec<User>>;
}

/// Resolve a caller-supplied id to a stored user
///
/// Malformed ids and unknown ids both fail with [`Error::UserNotFound`].
pub(crate) fn require_user<S: RecordStore + ?Sized>(store: &S, raw_id: &str) -> Result<User> {
    let not_found = || Error::UserNotFound(raw_id.to_string());
    let id: UserId = raw_id.parse().map_err(|_| not_found())?;
    store.find_by_key(&id)?.ok_or_else(not_found)
}

/// In-memory store, used by tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> MutexGuard<'_, Vec<User>> {
        // A poisoned lock still holds a consistent Vec: every mutation
        // below is a single push or assignment.
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecordStore for MemoryStore {
    fn find_by_key(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.users().iter().find(|u| u.id == *id).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    fn create(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users();
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(Error::UniqueViolation(new_user.username));
        }

        let user = User {
            id: UserId::new(),
            username: new_user.username,
            exercises: Vec::new(),
        };
        users.push(user.clone());
        Ok(user)
    }

    fn save(&self, user: &User) -> Result<User> {
        let mut users = self.users();
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| Error::UserNotFound(user.id.to_string()))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    fn all(&self) -> Result<Vec<User>> {
        Ok(self.users().clone())
    }
}
