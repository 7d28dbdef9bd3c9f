//! Exercise log engine: validates and appends entries to a user's log.
//!
//! Input is validated in full before the store is touched, so a rejected
//! append never changes the stored record. The append itself is one
//! read-modify-write through [`RecordStore::save`]. Two appends racing on
//! the same user can lose one of them if both read before either saves.

use crate::dates::{display_date, parse_date, parse_duration};
use crate::store::require_user;
use crate::{AppendResult, Error, Exercise, RecordStore, Result};
use chrono::{DateTime, Utc};

/// Appends exercises to user logs
pub struct ExerciseLog<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> ExerciseLog<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Append an entry, dated now unless `date` is given
    ///
    /// A blank `date` counts as absent. A non-blank `date` that does not
    /// parse is rejected rather than replaced with the current time.
    pub fn append_entry(
        &self,
        user_id: &str,
        description: &str,
        duration: &str,
        date: Option<&str>,
    ) -> Result<AppendResult> {
        self.append_entry_at(user_id, description, duration, date, Utc::now())
    }

    /// Same as [`Self::append_entry`] with an explicit clock
    pub fn append_entry_at(
        &self,
        user_id: &str,
        description: &str,
        duration: &str,
        date: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AppendResult> {
        let mut user = require_user(self.store, user_id)?;
        let exercise = build_exercise(description, duration, date, now)?;

        user.exercises.push(exercise.clone());
        let saved = self.store.save(&user)?;

        tracing::info!(
            "Logged {:?} ({} min) for {} on {}",
            exercise.description,
            exercise.duration,
            saved.username,
            exercise.date.to_rfc3339()
        );

        Ok(AppendResult {
            id: saved.id,
            username: saved.username,
            description: exercise.description,
            duration: exercise.duration,
            date: display_date(&exercise.date),
        })
    }
}

/// Validate raw input into an entry
fn build_exercise(
    description: &str,
    duration: &str,
    date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Exercise> {
    let duration = parse_duration(duration).ok_or_else(|| {
        tracing::warn!("Rejected duration {:?}", duration);
        Error::InvalidDuration(duration.to_string())
    })?;

    let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => now,
        Some(raw) => parse_date(raw).ok_or_else(|| {
            tracing::warn!("Rejected date {:?}", raw);
            Error::InvalidDate(raw.to_string())
        })?,
    };

    Ok(Exercise {
        description: description.to_string(),
        duration,
        date,
    })
}
