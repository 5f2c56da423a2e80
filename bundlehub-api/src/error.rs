/// Error handling for the API server
///
/// The upload API has a deliberately small wire contract: every response body
/// is `{"status": <string>, "error"?: <string>}` with HTTP 200, 400, or 500.
/// This module provides a unified error type that maps to that contract.
/// Handlers return `Result<T, ApiError>` which converts automatically.
///
/// # Example
///
/// ```
/// use bundlehub_api::error::{ApiError, ApiResult};
/// use bundlehub_api::routes::StatusResponse;
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<StatusResponse>> {
///     Err(ApiError::bad_request("Cannot find authorization"))
/// }
/// ```

use crate::routes::StatusResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): authorization, lookup, decode, storage, and
    /// metadata-write failures all land here per the upload contract.
    BadRequest {
        /// Human-readable status line (the response's `status` field)
        status: String,

        /// Optional diagnostic detail (the response's `error` field)
        error: Option<String>,
    },

    /// Internal server error (500): anything unexpected
    Internal {
        /// Human-readable status line
        status: String,

        /// Serialized underlying error
        error: Option<String>,
    },
}

impl ApiError {
    /// 400 with just a status line
    pub fn bad_request(status: impl Into<String>) -> Self {
        ApiError::BadRequest {
            status: status.into(),
            error: None,
        }
    }

    /// 400 with a status line and diagnostic detail
    pub fn bad_request_with(status: impl Into<String>, error: impl Into<String>) -> Self {
        ApiError::BadRequest {
            status: status.into(),
            error: Some(error.into()),
        }
    }

    /// 500 with the serialized underlying error
    pub fn internal(error: impl Into<String>) -> Self {
        ApiError::Internal {
            status: "Error unknow".to_string(),
            error: Some(error.into()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest { status, .. } => write!(f, "Bad request: {}", status),
            ApiError::Internal { status, .. } => write!(f, "Internal error: {}", status),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, status, error) = match self {
            ApiError::BadRequest { status, error } => (StatusCode::BAD_REQUEST, status, error),
            ApiError::Internal { status, error } => {
                // Log internal errors; the detail still goes to the caller
                // per the upload contract.
                tracing::error!(status = %status, error = ?error, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, status, error)
            }
        };

        (code, Json(StatusResponse { status, error })).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Database failures outside an explicitly-mapped handler step are
/// unexpected, so they surface as 500s.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::internal(format!("Database error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::bad_request("Cannot find authorization");
        assert_eq!(err.to_string(), "Bad request: Cannot find authorization");

        let err = ApiError::internal("boom");
        assert_eq!(err.to_string(), "Internal error: Error unknow");
    }

    #[test]
    fn test_bad_request_response() {
        let response = ApiError::bad_request("Cannot Verify User").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_response() {
        let response = ApiError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_body_shape() {
        let body = StatusResponse {
            status: "Cannot Upload File".to_string(),
            error: Some("disk full".to_string()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "Cannot Upload File");
        assert_eq!(json["error"], "disk full");

        // `error` is omitted when absent
        let body = StatusResponse {
            status: "ok".to_string(),
            error: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("error").is_none());
    }
}
