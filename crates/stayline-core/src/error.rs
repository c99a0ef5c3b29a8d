use thiserror::Error;

/// Errors raised while building domain values.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A value is outside its domain, such as month 13 or a negative rate.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
