//! Post error type.

use biber_renderer::{EscapeError, ParseError, RenderError};

use crate::date::DateError;

/// Failure while reading or rendering a post.
///
/// Metadata errors carry the 1-based line number of the offending line.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("line {line}: expected 'key: value', got '{content}'")]
    InvalidLine { line: usize, content: String },

    #[error("line {line}: unknown metadata key '{key}'")]
    UnknownKey { line: usize, key: String },

    #[error("line {line}: metadata key '{key}' given twice")]
    DuplicateKey { line: usize, key: String },

    #[error("line {line}: metadata key '{key}' has no value")]
    EmptyValue { line: usize, key: String },

    #[error("line {line}: {source}")]
    InvalidDate {
        line: usize,
        #[source]
        source: DateError,
    },

    #[error("line {line}: invalid list for '{key}': {source}")]
    InvalidList {
        line: usize,
        key: String,
        #[source]
        source: EscapeError,
    },

    #[error("missing required metadata key '{0}'")]
    MissingKey(&'static str),

    #[error("Parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),
}
