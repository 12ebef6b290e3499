//! Errors which can happen in various parts of the library.

use thiserror::Error;

use crate::style::expression::ExpressionError;

#[derive(Error, Debug)]
pub enum Error {
    /// The bucket settings are out of range.
    #[error("invalid bucket settings: {0}")]
    Settings(String),
    /// The device failed to create a buffer.
    #[error("uploading buffer `{label}` failed: {reason}")]
    Upload { label: &'static str, reason: String },
    /// A paint property could not be parsed.
    #[error("invalid paint property `{property}`")]
    Style {
        property: &'static str,
        #[source]
        source: ExpressionError,
    },
}

impl Error {
    pub fn upload(label: &'static str, reason: impl ToString) -> Self {
        Error::Upload {
            label,
            reason: reason.to_string(),
        }
    }
}
