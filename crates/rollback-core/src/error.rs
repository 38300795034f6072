//! Error types for rollback-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while merging or synthesizing table rows
///
/// Every variant is fatal for the patch step that produced it. Lenient cases
/// (malformed override lines, override keys that match no column) never
/// surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// The host has no table with this name
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// A table has no header line
    #[error("table '{0}' is empty")]
    EmptyTable(String),

    /// A range marker row is missing from a table
    #[error("marker '{marker}' not found in table '{table}'")]
    MarkerNotFound { table: String, marker: String },

    /// A synthesized row names a parent that does not exist
    #[error("parent row '{parent}' not found in table '{table}'")]
    ParentNotFound { table: String, parent: String },

    /// The parent of a synthesized row has no description row
    #[error("no {kind}_desc row for parent '{parent}'")]
    DescriptionNotFound { kind: String, parent: String },

    /// An override name has no equipment alias
    #[error("override for row '{row}' names unknown equipment '{value}'")]
    UnresolvedAlias { row: String, value: String },

    /// An override section for a named table does not supply a name
    #[error("override for row '{row}' has no name value")]
    MissingName { row: String },

    /// The mod package does not contain the requested file
    #[error("packaged file '{0}' not found")]
    PackagedFileNotFound(String),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV writer error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
