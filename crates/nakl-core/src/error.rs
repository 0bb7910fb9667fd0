//! Error types for the nakl-core library.

use thiserror::Error;

/// Main error type for the nakl library.
#[derive(Error, Debug)]
pub enum NaklError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configured regular expression failed to compile.
    #[error("invalid pattern for {field}: {source}")]
    Pattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised inside a single extraction run.
///
/// These never escape `WaybillParser::parse`; they are turned into
/// the `error` field of an empty record at the orchestration boundary.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No text was supplied.
    #[error("empty input text")]
    EmptyInput,

    /// Unexpected fault during extraction.
    #[error("internal fault: {0}")]
    Internal(String),
}

/// Result type for the nakl library.
pub type Result<T> = std::result::Result<T, NaklError>;
