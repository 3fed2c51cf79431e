//! Error types for slide planning.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a planning run.
///
/// Only input problems are fatal. Oracle failures are recovered per section
/// by the extractor and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read an input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// An input artifact or mapping file is not valid JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The template/intent configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The narration script contains no usable text.
    #[error("Input document is empty")]
    EmptyDocument,

    /// Fields stored for a slide do not fit its template.
    #[error("Fields do not match template '{template}': {reason}")]
    FieldMismatch { template: String, reason: String },
}
