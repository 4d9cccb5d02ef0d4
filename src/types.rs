// Error types shared by the resource handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Body returned for unexpected failures; internals are only logged.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "Sorry, this request could not be processed. Please try again later.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(_) | ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::BadRequest(message) => {
                (status, Json(serde_json::json!({ "error": message }))).into_response()
            }
            ApiError::NotFound => status.into_response(),
            ApiError::Database(_) | ApiError::Serialization(_) => {
                error!(error = %self, "Request failed");
                (
                    status,
                    Json(serde_json::json!({ "error_message": INTERNAL_ERROR_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}
