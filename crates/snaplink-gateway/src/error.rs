use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use snaplink_resolver::ResolutionError;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// The request body could not be read as the expected JSON.
    BadRequest(String),
    Resolution(ResolutionError),
    /// The stored URL cannot be sent as a `Location` header.
    InvalidRedirect(String),
    Metrics(prometheus::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<ResolutionError> for AppError {
    fn from(error: ResolutionError) -> Self {
        AppError::Resolution(error)
    }
}

impl From<prometheus::Error> for AppError {
    fn from(error: prometheus::Error) -> Self {
        AppError::Metrics(error)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Resolution(ResolutionError::InvalidUrl(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Resolution(ResolutionError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "short code not found".to_string())
            }
            AppError::Resolution(other) => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::InvalidRedirect(code) => {
                error!(code = %code, "stored url is not a valid Location header");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::Metrics(e) => {
                error!(error = %e, "failed to encode metrics");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
