use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use libomnipost::error::{AuthError, OmnipostError, PlatformError};

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// Request had no bearer token where one is required.
    NoAccessToken,
    /// A required upload field was absent.
    MissingUpload(String),
    /// Upload exceeded the configured size cap.
    FileTooLarge { limit_bytes: u64 },
    /// Request was malformed in some other way.
    BadRequest(String),
    /// An error bubbled up from the library.
    Lib(OmnipostError),
    /// Anything unexpected.
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NoAccessToken => write!(f, "No access token provided"),
            ApiError::MissingUpload(msg) => write!(f, "{}", msg),
            ApiError::FileTooLarge { limit_bytes } => {
                write!(f, "File exceeds {} byte limit", limit_bytes)
            }
            ApiError::BadRequest(msg) => write!(f, "{}", msg),
            ApiError::Lib(err) => write!(f, "{}", err),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<OmnipostError> for ApiError {
    fn from(err: OmnipostError) -> Self {
        ApiError::Lib(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NoAccessToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "No access token provided" }),
            ),
            ApiError::MissingUpload(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            ApiError::FileTooLarge { limit_bytes } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "File too large",
                    "message": format!(
                        "The uploaded file exceeds the maximum size limit of {}MB",
                        limit_bytes / (1024 * 1024)
                    ),
                }),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Lib(err) => lib_error_response(err),
            ApiError::Internal(msg) => internal_response(msg),
        };

        (status, Json(body)).into_response()
    }
}

fn lib_error_response(err: &OmnipostError) -> (StatusCode, serde_json::Value) {
    match err {
        OmnipostError::Auth(AuthError::Expired(_)) => (
            StatusCode::UNAUTHORIZED,
            json!({
                "error": "Authentication expired",
                "message": "Please reconnect your account",
            }),
        ),
        OmnipostError::Auth(AuthError::InvalidState) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Invalid state parameter" }),
        ),
        OmnipostError::Platform(PlatformError::RateLimit(_)) => (
            StatusCode::TOO_MANY_REQUESTS,
            json!({
                "error": "Rate limit exceeded",
                "message": "Too many requests. Please try again later.",
            }),
        ),
        OmnipostError::Platform(PlatformError::Authentication(msg)) => (
            StatusCode::UNAUTHORIZED,
            json!({ "error": msg }),
        ),
        OmnipostError::Config(_) => internal_response(&err.to_string()),
        _ => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
    }
}

fn internal_response(detail: &str) -> (StatusCode, serde_json::Value) {
    // Raw detail only leaks in debug builds
    let body = if cfg!(debug_assertions) {
        json!({ "error": "Internal server error", "detail": detail })
    } else {
        json!({ "error": "Internal server error" })
    };
    (StatusCode::INTERNAL_SERVER_ERROR, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use libomnipost::error::ConfigError;

    #[test]
    fn test_no_access_token_is_401() {
        let response = ApiError::NoAccessToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_missing_upload_is_400() {
        let response =
            ApiError::MissingUpload("No video file provided".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_file_too_large_is_400() {
        let response = ApiError::FileTooLarge {
            limit_bytes: 100 * 1024 * 1024,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_expired_auth_is_401() {
        let err = ApiError::Lib(AuthError::Expired("invalid_grant".to_string()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_rate_limit_is_429() {
        let err = ApiError::Lib(PlatformError::RateLimit("slow down".to_string()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_posting_failure_is_400() {
        let err = ApiError::Lib(PlatformError::Posting("rejected".to_string()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_config_error_is_500() {
        let err = ApiError::Lib(ConfigError::MissingField("oauth.twitter".to_string()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(
            ApiError::NoAccessToken.to_string(),
            "No access token provided"
        );
        assert!(ApiError::Internal("boom".to_string())
            .to_string()
            .contains("boom"));
    }
}
