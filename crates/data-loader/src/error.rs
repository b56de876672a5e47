//! Error types for the data-loader crate.
//!
//! Every failure the loader or a repository can report is one variant of
//! [`DataError`]. Variants carry enough context (file, line, field) to point
//! at the offending record.

use thiserror::Error;

/// Errors that can occur while loading, validating or reading award data
#[derive(Error, Debug)]
pub enum DataError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line} of {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Referenced entity doesn't exist (e.g., nomination for a non-existent movie)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },

    /// Two movies resolved to the same slug
    #[error("Duplicate slug '{slug}' shared by movies {first} and {second}")]
    DuplicateSlug { slug: String, first: u32, second: u32 },

    /// The backing store could not serve a read
    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataError>;
