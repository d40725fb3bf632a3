use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A movement (or a record destined to become one) is outside its field domain.
    #[error("validation failed for `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// An aggregate that needs at least one row was asked for over an empty collection.
    #[error("no data: {0}")]
    NoData(&'static str),

    /// A closed-set value the caller passed is not part of its set.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CoreError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CoreError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        CoreError::InvalidArgument(detail.into())
    }
}
