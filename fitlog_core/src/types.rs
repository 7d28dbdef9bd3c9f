//! Core domain types for the fitlog system.
//!
//! This module defines:
//! - Users and their identifiers
//! - Exercise entries (the per-user log)
//! - Result shapes returned by the registry, log engine and query engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identity
// ============================================================================

/// Opaque user identifier, assigned by the store at creation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// ============================================================================
// Records
// ============================================================================

/// One timestamped activity record
///
/// Entries are only ever appended to a user's log, never edited.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub description: String,
    /// Minutes
    pub duration: f64,
    pub date: DateTime<Utc>,
}

/// A user and their exercise log, as stored
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl User {
    /// Identity fields only
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// A user that has not been assigned an id yet
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
}

// ============================================================================
// Operation results
// ============================================================================

/// Returned by user creation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

/// Returned by a successful append
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AppendResult {
    pub id: UserId,
    pub username: String,
    pub description: String,
    pub duration: f64,
    /// Human-readable date, e.g. `Thu Jan 05 2023`
    pub date: String,
}

/// An exercise as presented in query results
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LogEntry {
    pub description: String,
    pub duration: f64,
    pub date: String,
}

impl From<&Exercise> for LogEntry {
    fn from(exercise: &Exercise) -> Self {
        LogEntry {
            description: exercise.description.clone(),
            duration: exercise.duration,
            date: crate::dates::display_date(&exercise.date),
        }
    }
}

/// Returned by a log query
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LogResult {
    pub id: UserId,
    pub username: String,
    pub log: Vec<LogEntry>,
    /// Length of `log`, after filtering and truncation
    pub count: usize,
}
