//! Error types for txdash-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use txdash_core::CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Internal server error")]
    InternalError,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidMonth { .. } | CoreError::ValidationError { .. } => ApiError::BadRequest {
                message: error.to_string(),
            },
            other => {
                log::error!(target: "txdash::api", "{}", other);
                ApiError::InternalError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        log::warn!(target: "txdash::api", "{} {}", status.as_u16(), self);
        let body = format!(
            r#"<div class='p-4 bg-red-50 text-red-700 rounded-lg border border-red-200'>{}</div>"#,
            txdash_utils::escape_html(&self.to_string())
        );
        (status, axum::response::Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_month_is_bad_request() {
        let error = ApiError::from(CoreError::InvalidMonth {
            value: "Smarch".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "Bad request: Invalid month: Smarch");
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let error = ApiError::from(CoreError::ValidationError {
            message: "page must be at least 1".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.to_string().contains("page must be at least 1"));
    }

    #[test]
    fn test_internal_error_hides_details() {
        let error = ApiError::from(CoreError::InternalError {
            message: "client build failed".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "Internal server error");
    }
}
