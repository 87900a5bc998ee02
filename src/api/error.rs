use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::omdb::OmdbError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Failure surfaced by a route handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Omdb(#[from] OmdbError),
}

impl ApiError {
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Omdb(e) => match e {
                OmdbError::UpstreamHttp { .. } | OmdbError::Transport(_) => {
                    (StatusCode::BAD_GATEWAY, "upstream_error")
                }
                OmdbError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout"),
                OmdbError::Decode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "decode_error"),
                OmdbError::Client(_) | OmdbError::MissingApiKey => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        let message = self.to_string();

        tracing::error!(
            error_code = code,
            status_code = status.as_u16(),
            error = %message,
            "Request error"
        );

        let body = ErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
