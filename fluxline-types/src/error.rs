//! Error types for the record model.

use thiserror::Error;

/// Errors raised when constructing model values from invalid input.
///
/// Construction fails immediately; the model never substitutes a default
/// for a missing or blank required part.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A tag key was empty or whitespace-only.
    #[error("tag key must not be blank")]
    BlankTagKey,

    /// A tag value was empty or whitespace-only.
    #[error("value for tag `{0}` must not be blank")]
    BlankTagValue(String),

    /// A field key was empty or whitespace-only.
    #[error("field key must not be blank")]
    BlankFieldKey,

    /// A string field value was empty or whitespace-only.
    #[error("string value for field `{0}` must not be blank")]
    BlankFieldValue(String),
}
