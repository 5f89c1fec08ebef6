//! Error types for fgb-analysis
//!
//! Every variant is terminal for a batch run; there is no partial-result
//! recovery.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the analysis pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Input file absent or unreadable
    #[error("Missing input file {path}: {reason}")]
    MissingInputFile { path: PathBuf, reason: String },

    /// Required column absent or stimulus columns disagree with the config
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Group code with no configured label
    #[error("Unknown group code '{code}' for participant '{participant}'")]
    UnknownGroupCode { code: String, participant: String },

    /// Response cell outside the two valid encodings
    #[error("Invalid response value '{value}' for participant '{participant}' in column '{column}'")]
    InvalidResponseValue {
        participant: String,
        column: String,
        value: String,
    },

    /// Chi-square test undefined for the table
    #[error("Degenerate contingency table: {0}")]
    DegenerateContingencyTable(String),

    /// Participants missing from one side of the merge
    #[error("{} participant(s) not present in both tables: {}", .0.len(), .0.join(", "))]
    UnmatchedParticipant(Vec<String>),

    /// Same participant identifier on more than one row
    #[error("Duplicate participant '{participant}' in {table} table")]
    DuplicateParticipant { participant: String, table: String },

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Chart rendering errors
    #[error("Chart error: {0}")]
    Chart(String),

    /// Report serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration or other shared errors
    #[error(transparent)]
    Common(#[from] fgb_common::Error),
}

/// Convenience Result type using fgb-analysis Error
pub type Result<T> = std::result::Result<T, Error>;
