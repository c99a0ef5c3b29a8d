use thiserror::Error;

use crate::fetcher::FeedError;

/// Errors returned by engine operations. Quote-path "no price" outcomes are
/// `None` values, not errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] stayline_db::error::DbError),

    #[error(transparent)]
    DieselError(#[from] diesel::result::Error),

    #[error(transparent)]
    CoreError(#[from] stayline_core::error::CoreError),

    /// An external feed could not be fetched or parsed.
    #[error("Feed error: {0}")]
    FeedError(#[from] FeedError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("Feed file error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
