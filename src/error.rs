//! Error types for guichet.

use thiserror::Error;

/// Common error type for guichet.
#[derive(Error, Debug)]
pub enum GuichetError {
    /// The caller exceeded the submission rate limit.
    #[error("rate limited, retry after {retry_after} seconds")]
    RateLimited {
        /// Seconds until the window admits another submission.
        retry_after: u64,
    },

    /// The request body failed parsing or validation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Transport configuration error (missing or invalid SMTP settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// The outbound transport could not be constructed.
    #[error("transport initialization error: {0}")]
    TransportInit(String),

    /// The outbound send was attempted and failed.
    ///
    /// `detail` and `code` are operator-facing diagnostics; they reach the
    /// caller only when verbose errors are enabled.
    #[error("send failure: {detail}")]
    Send {
        /// Full transport error message.
        detail: String,
        /// SMTP status code, if the server replied with one.
        code: Option<String>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything not classified above. Mapped to a generic 500 at the
    /// handler boundary, never surfaced verbatim to the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for guichet operations.
pub type Result<T> = std::result::Result<T, GuichetError>;
