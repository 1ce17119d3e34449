use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: &'static str,
    pub message: &'static str,
}

/// Failure of an upstream-backed handler. Always rendered as a generic 500; the
/// underlying chain goes to logs and Sentry only.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        sentry_anyhow::capture_anyhow(&self.0);
        tracing::error!(error = %format!("{:#}", self.0), "upstream request failed");

        let body = ApiError {
            code: "UPSTREAM_ERROR",
            message: "upstream request failed",
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
