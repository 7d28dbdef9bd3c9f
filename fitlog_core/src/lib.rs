#![forbid(unsafe_code)]

//! Core data model and query engine for fitlog.
//!
//! This crate provides:
//! - Domain types (users, exercise entries, query results)
//! - Record store trait with file-backed and in-memory stores
//! - User registry with username uniqueness
//! - Exercise log engine (validated appends)
//! - Log query engine (inclusive date range, prefix limit)
//! - CSV export, configuration and logging setup

pub mod types;
pub mod error;
pub mod dates;
pub mod config;
pub mod logging;
pub mod store;
pub mod file_store;
pub mod registry;
pub mod exercise_log;
pub mod query;
pub mod export;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
pub use types::*;
pub use config::Config;
pub use store::{MemoryStore, RecordStore};
pub use file_store::JsonFileStore;
pub use registry::UserRegistry;
pub use exercise_log::ExerciseLog;
pub use query::{LogFilter, LogQuery, LogQueryEngine};
pub use export::{export_log_csv, export_log_csv_to_path};
