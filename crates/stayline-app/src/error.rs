use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Writer, async_trait};
use serde::Serialize;
use thiserror::Error;

use stayline_core::error::CoreError;
use stayline_service::error::ServiceError;

/// Errors of the HTTP layer, each mapped to a status code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Response error: {0}")]
    ResponseError(#[from] salvo::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::ServiceError(ServiceError::ValidationError(_))
            | Self::CoreError(CoreError::InvalidInput(_) | CoreError::ParseError(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) | Self::ServiceError(ServiceError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::ServiceError(ServiceError::FeedError(_)) => StatusCode::BAD_GATEWAY,
            Self::ServiceError(_) | Self::CoreError(_) | Self::ResponseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }

        res.status_code(status);
        res.render(Json(ErrorResponse {
            error: self.to_string(),
        }));
    }
}
