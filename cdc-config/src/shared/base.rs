use thiserror::Error;

/// Errors reported by the `validate` methods of the shared configuration types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A field holds a value outside of its allowed range.
    #[error("Invalid value for `{field}`: {constraint}")]
    InvalidFieldValue { field: String, constraint: String },
}

impl ValidationError {
    pub(crate) fn empty(field: &str) -> Self {
        ValidationError::InvalidFieldValue {
            field: field.to_string(),
            constraint: "must not be empty".to_string(),
        }
    }
}
