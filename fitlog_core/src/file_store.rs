//! JSON document store with file locking.
//!
//! All users live in a single `users.json` document inside the data
//! directory. A sidecar `users.lock` file serializes access: readers take a
//! shared lock, writers an exclusive one. Writes go to a temp file that is
//! synced and renamed over the document, so a crash mid-write leaves the
//! previous version intact.

use crate::{Error, NewUser, RecordStore, Result, User, UserId};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

const DOCUMENT_FILE: &str = "users.json";
const LOCK_FILE: &str = "users.lock";
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// On-disk document format
#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersDocument {
    #[serde(default)]
    users: Vec<User>,
}

/// File-backed [`RecordStore`]
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    lock_timeout: Duration,
}

#[derive(Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Held store lock, released on drop
struct LockGuard(File);

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.0) {
            tracing::warn!("Failed to release store lock: {}", e);
        }
    }
}

impl JsonFileStore {
    /// Open (or initialize) a store in the given directory
    pub fn open(dir: impl Into<PathBuf>, lock_timeout: Duration) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let store = Self { dir, lock_timeout };
        // Touch the lock file so readers never race on its creation
        store.lock_file()?;
        tracing::debug!("Opened store at {:?}", store.dir);
        Ok(store)
    }

    /// Close the store
    ///
    /// Every write is durable when it returns, so there is nothing to flush.
    pub fn close(self) {
        tracing::debug!("Closed store at {:?}", self.dir);
    }

    /// Path of the JSON document
    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    fn lock_file(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?)
    }

    /// Poll for the lock until the timeout elapses
    fn acquire(&self, mode: LockMode) -> Result<LockGuard> {
        let file = self.lock_file()?;
        let started = Instant::now();

        loop {
            let attempt = match mode {
                LockMode::Shared => FileExt::try_lock_shared(&file),
                LockMode::Exclusive => FileExt::try_lock_exclusive(&file),
            };

            match attempt {
                Ok(()) => return Ok(LockGuard(file)),
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if started.elapsed() >= self.lock_timeout {
                        return Err(Error::StoreTimeout {
                            path: self.lock_path(),
                            timeout_ms: self.lock_timeout.as_millis() as u64,
                        });
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }

    /// Read the document; caller must hold a lock
    fn read_document(&self) -> Result<UsersDocument> {
        let path = self.document_path();
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(UsersDocument::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        if contents.trim().is_empty() {
            return Ok(UsersDocument::default());
        }

        serde_json::from_str(&contents).map_err(|e| Error::CorruptStore {
            path: path.clone(),
            details: e.to_string(),
        })
    }

    /// Atomically replace the document; caller must hold the exclusive lock
    fn write_document(&self, document: &UsersDocument) -> Result<()> {
        let path = self.document_path();
        let temp = NamedTempFile::new_in(&self.dir)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(document)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} users to {:?}", document.users.len(), path);
        Ok(())
    }

    /// Run a read-only closure against the document under a shared lock
    fn read_with<T>(&self, f: impl FnOnce(UsersDocument) -> T) -> Result<T> {
        let _guard = self.acquire(LockMode::Shared)?;
        let document = self.read_document()?;
        Ok(f(document))
    }

    /// Load, modify and write back the document under an exclusive lock
    ///
    /// Nothing is written if the closure fails.
    fn update<T>(&self, f: impl FnOnce(&mut UsersDocument) -> Result<T>) -> Result<T> {
        let _guard = self.acquire(LockMode::Exclusive)?;
        let mut document = self.read_document()?;
        let value = f(&mut document)?;
        self.write_document(&document)?;
        Ok(value)
    }

    /// Directory holding the store files
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RecordStore for JsonFileStore {
    fn find_by_key(&self, id: &UserId) -> Result<Option<User>> {
        self.read_with(|doc| doc.users.into_iter().find(|u| u.id == *id))
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.read_with(|doc| doc.users.into_iter().find(|u| u.username == username))
    }

    fn create(&self, new_user: NewUser) -> Result<User> {
        let user = self.update(|doc| {
            if doc.users.iter().any(|u| u.username == new_user.username) {
                return Err(Error::UniqueViolation(new_user.username.clone()));
            }
            let user = User {
                id: UserId::new(),
                username: new_user.username.clone(),
                exercises: Vec::new(),
            };
            doc.users.push(user.clone());
            Ok(user)
        })?;

        tracing::debug!("Stored new user {} ({})", user.username, user.id);
        Ok(user)
    }

    fn save(&self, user: &User) -> Result<User> {
        self.update(|doc| {
            let slot = doc
                .users
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| Error::UserNotFound(user.id.to_string()))?;
            *slot = user.clone();
            Ok(user.clone())
        })
    }

    fn all(&self) -> Result<Vec<User>> {
        self.read_with(|doc| doc.users)
    }
}
