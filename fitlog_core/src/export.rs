//! CSV export of a user's exercise log.
//!
//! Rows use the same filter as [`crate::LogQueryEngine::query_log`] but keep
//! full RFC 3339 timestamps so the export can be re-imported elsewhere.

use crate::{Exercise, LogQuery, LogQueryEngine, RecordStore, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    description: &'a str,
    duration: f64,
    date: String,
}

impl<'a> From<&'a Exercise> for CsvRow<'a> {
    fn from(exercise: &'a Exercise) -> Self {
        CsvRow {
            description: &exercise.description,
            duration: exercise.duration,
            date: exercise.date.to_rfc3339(),
        }
    }
}

/// Write a user's filtered log as CSV, returning the number of rows
///
/// The header is always written, even when no rows match.
pub fn export_log_csv<S, W>(store: &S, user_id: &str, query: &LogQuery, writer: W) -> Result<usize>
where
    S: RecordStore + ?Sized,
    W: Write,
{
    let entries = LogQueryEngine::new(store).filtered_entries(user_id, query)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(["description", "duration", "date"])?;
    for exercise in &entries {
        writer.serialize(CsvRow::from(exercise))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} entries for user {}", entries.len(), user_id);
    Ok(entries.len())
}

/// Export to a file, replacing it atomically
///
/// The CSV is written to a temp file next to `path`, synced, then renamed
/// over `path`. A failed export leaves any previous file untouched.
pub fn export_log_csv_to_path<S>(
    store: &S,
    user_id: &str,
    query: &LogQuery,
    path: &Path,
) -> Result<usize>
where
    S: RecordStore + ?Sized,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let temp = NamedTempFile::new_in(dir)?;
    let count = export_log_csv(store, user_id, query, temp.as_file())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| crate::Error::Io(e.error))?;

    tracing::info!("Wrote export to {:?}", path);
    Ok(count)
}
