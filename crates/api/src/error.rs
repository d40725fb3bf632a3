use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use radar_core::CoreError;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    SessionNotFound(Uuid),
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::Validation { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Core(CoreError::NoData(_)) => StatusCode::NOT_FOUND,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Core(CoreError::InvalidArgument(_)) => "invalid_argument",
            ApiError::Core(CoreError::Validation { .. }) => "validation",
            ApiError::Core(CoreError::NoData(_)) => "no_data",
            ApiError::SessionNotFound(_) => "session_not_found",
            ApiError::Internal(_) => "internal",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Core(err) => err.to_string(),
            ApiError::SessionNotFound(id) => format!("session {id} not found"),
            ApiError::Internal(_) => "internal error".to_string(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            sentry_anyhow::capture_anyhow(err);
            tracing::error!(error = %err, "request failed");
        }
        let body = Json(json!({
            "error": self.kind(),
            "message": self.message(),
        }));
        (self.status(), body).into_response()
    }
}
