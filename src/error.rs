//! Error types for the extractor
//!
//! The page client, the table casts and the payload encoder return
//! [`ExtractError`] so callers can tell a skippable page failure from a
//! fatal cast failure. Orchestration code wraps these in `eyre` reports.

use crate::locale::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The index service answered with a non-success status or an unreadable body.
    #[error("Request for page {page} failed: {message}")]
    Request { page: u32, message: String },

    /// A cell did not match the expected locale-formatted number.
    #[error("Failed to cast column '{column}'")]
    Cast {
        column: String,
        #[source]
        source: ParseError,
    },

    /// A column required by the casts is not present in the table.
    #[error("Column '{0}' not found in consolidated table")]
    MissingColumn(String),

    /// The page request could not be serialized.
    #[error("Failed to encode page request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ExtractError {
    pub fn request(page: u32, message: impl Into<String>) -> Self {
        Self::Request {
            page,
            message: message.into(),
        }
    }
}
