//! Error types for ledgerdash-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledgerdash_core::{CoreError, ErrorCode, ErrorSeverity};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Failure from the ledger pipeline, shown verbatim
    #[error(transparent)]
    Upstream(#[from] CoreError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Upstream(error) => match error.code() {
                ErrorCode::InvalidDate | ErrorCode::ConfigError => StatusCode::BAD_REQUEST,
                ErrorCode::ProcessError | ErrorCode::ParseError | ErrorCode::PrefetchFailed => {
                    StatusCode::BAD_GATEWAY
                }
                ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ApiError::BadRequest { .. } => ErrorSeverity::Warning,
            ApiError::Upstream(error) => error.severity(),
        }
    }

    pub fn code(&self) -> String {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST".to_string(),
            ApiError::Upstream(error) => error.code().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.severity() {
            ErrorSeverity::Warning => log::debug!("Request rejected: {}", self),
            ErrorSeverity::Error => log::warn!("Request failed: {}", self),
            ErrorSeverity::Critical => log::error!("Request failed: {}", self),
        }

        let mut body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        if let ApiError::Upstream(error) = &self {
            let details = error.to_details();
            if let Some(detail) = details.details {
                body["details"] = detail;
            }
            if !details.suggestions.is_empty() {
                body["suggestions"] = serde_json::json!(details.suggestions);
            }
        }
        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
