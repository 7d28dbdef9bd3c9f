//! Log query engine: date-range filtering and limit truncation.
//!
//! Filters run in a fixed order over the stored log: lower bound, upper
//! bound, then limit. Both bounds are inclusive. The limit keeps a prefix
//! of the filtered entries. Entries are never reordered.
//!
//! Query parameters are permissive: a bound or limit that does not parse
//! is ignored rather than reported.

use crate::dates::{parse_date, parse_limit};
use crate::store::require_user;
use crate::{Exercise, LogEntry, LogResult, RecordStore, Result};
use chrono::{DateTime, Utc};

/// Raw query parameters as supplied by the caller
#[derive(Clone, Debug, Default)]
pub struct LogQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
}

/// Parsed, validated filter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl LogFilter {
    /// Parse raw parameters, dropping any that do not parse
    pub fn parse(query: &LogQuery) -> Self {
        let filter = LogFilter {
            from: query.from.as_deref().and_then(parse_date),
            to: query.to.as_deref().and_then(parse_date),
            limit: query.limit.as_deref().and_then(parse_limit),
        };

        if query.from.is_some() && filter.from.is_none() {
            tracing::debug!("Ignoring unparseable from bound {:?}", query.from);
        }
        if query.to.is_some() && filter.to.is_none() {
            tracing::debug!("Ignoring unparseable to bound {:?}", query.to);
        }
        if query.limit.is_some() && filter.limit.is_none() {
            tracing::debug!("Ignoring unparseable limit {:?}", query.limit);
        }

        filter
    }

    /// Whether an entry falls within both bounds
    pub fn in_range(&self, exercise: &Exercise) -> bool {
        self.from.map_or(true, |from| exercise.date >= from)
            && self.to.map_or(true, |to| exercise.date <= to)
    }

    /// Filter then truncate, preserving log order
    pub fn apply<'e>(&self, exercises: &'e [Exercise]) -> Vec<&'e Exercise> {
        exercises
            .iter()
            .filter(|e| self.in_range(e))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// Reads filtered views of user logs
pub struct LogQueryEngine<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> LogQueryEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Query a user's log
    pub fn query_log(&self, user_id: &str, query: &LogQuery) -> Result<LogResult> {
        let user = require_user(self.store, user_id)?;
        let filter = LogFilter::parse(query);

        let log: Vec<LogEntry> = filter
            .apply(&user.exercises)
            .into_iter()
            .map(LogEntry::from)
            .collect();

        tracing::debug!(
            "Query for {} returned {} of {} entries",
            user.username,
            log.len(),
            user.exercises.len()
        );

        Ok(LogResult {
            id: user.id,
            username: user.username,
            count: log.len(),
            log,
        })
    }

    /// Filtered raw entries, for callers that need full timestamps
    pub fn filtered_entries(&self, user_id: &str, query: &LogQuery) -> Result<Vec<Exercise>> {
        let user = require_user(self.store, user_id)?;
        let filter = LogFilter::parse(query);
        Ok(filter.apply(&user.exercises).into_iter().cloned().collect())
    }
}
