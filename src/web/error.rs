//! API error handling for the contact endpoint.
//!
//! This is the outer boundary of the submission pipeline: every
//! [`GuichetError`] is translated here into a terminal HTTP response.
//! Server-side detail goes to tracing; caller-facing bodies stay generic
//! unless verbose errors are explicitly enabled.

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::GuichetError;

/// Caller-facing error body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Seconds until the rate limit admits another submission (429 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    /// Underlying transport error message (verbose mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// SMTP status code of the failure (verbose mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    retry_after: Option<u64>,
    details: Option<String>,
    code: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after: None,
            details: None,
            code: None,
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a rate-limited error carrying the remaining cooldown.
    pub fn rate_limited(retry_after: u64) -> Self {
        let mut err = Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again later.",
        );
        err.retry_after = Some(retry_after);
        err
    }

    /// Create an internal server error with a generic message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Get the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Translate a pipeline error into its terminal HTTP response.
    ///
    /// `verbose` controls whether transport failure detail is included in
    /// the caller-facing body; it never affects what is logged.
    pub fn from_error(err: GuichetError, verbose: bool) -> Self {
        match err {
            GuichetError::RateLimited { retry_after } => Self::rate_limited(retry_after),
            GuichetError::BadRequest(message) => Self::bad_request(message),
            GuichetError::Config(detail) => {
                tracing::error!(detail = %detail, "email configuration error");
                Self::internal("Email service configuration error")
            }
            GuichetError::TransportInit(detail) => {
                tracing::error!(detail = %detail, "transport initialization error");
                Self::internal("Failed to initialize email service")
            }
            GuichetError::Send { detail, code } => {
                tracing::error!(
                    detail = %detail,
                    code = code.as_deref().unwrap_or("-"),
                    "email sending error"
                );
                let mut api_err = Self::internal("Failed to send email. Please try again later.");
                if verbose {
                    api_err.details = Some(detail);
                    api_err.code = code;
                }
                api_err
            }
            other => {
                tracing::error!(error = %other, "unexpected error in contact pipeline");
                Self::internal("An unexpected error occurred. Please try again later.")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            retry_after: self.retry_after,
            details: self.details,
            code: self.code,
        };

        let mut response = (self.status, Json(body)).into_response();

        if let Some(secs) = self.retry_after {
            let headers = response.headers_mut();
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                headers.insert(RETRY_AFTER, value);
            }
            headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
        }

        response
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}
