//! Core error types for the xweb framework.
//!
//! [`XwebError`] covers request-level failures (malformed bodies, oversized
//! uploads, missing resources), configuration problems, and I/O. Route
//! registration has its own error type in `xweb-http` because it is reported
//! to the registrant at startup rather than to a client.

use thiserror::Error;

/// The primary error type for the xweb framework.
///
/// Each variant maps to an HTTP status code via [`XwebError::status_code`].
/// None of these messages are ever sent to a client verbatim; the dispatcher
/// turns failures into opaque responses.
#[derive(Error, Debug)]
pub enum XwebError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 405 Method Not Allowed.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// HTTP 413 Payload Too Large.
    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge {
        /// Size of the rejected body.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    // ── Response ─────────────────────────────────────────────────────

    /// The response was already finished and cannot accept more output.
    #[error("Response already finished")]
    ResponseFinished,

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl XwebError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest` -> 400
    /// - `NotFound` -> 404
    /// - `MethodNotAllowed` -> 405
    /// - `PayloadTooLarge` -> 413
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::PayloadTooLarge { .. } => 413,
            Self::InternalServerError(_)
            | Self::ResponseFinished
            | Self::ConfigurationError(_)
            | Self::IoError(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, XwebError>`.
pub type XwebResult<T> = Result<T, XwebError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xweb_error_status_codes() {
        assert_eq!(XwebError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(XwebError::NotFound("x".into()).status_code(), 404);
        assert_eq!(XwebError::MethodNotAllowed("x".into()).status_code(), 405);
        assert_eq!(
            XwebError::PayloadTooLarge { size: 10, limit: 5 }.status_code(),
            413
        );
        assert_eq!(XwebError::InternalServerError("x".into()).status_code(), 500);
        assert_eq!(XwebError::ResponseFinished.status_code(), 500);
        assert_eq!(XwebError::ConfigurationError("x".into()).status_code(), 500);
    }

    #[test]
    fn test_xweb_error_display() {
        let err = XwebError::NotFound("page".into());
        assert_eq!(err.to_string(), "Not found: page");

        let err = XwebError::PayloadTooLarge { size: 10, limit: 5 };
        assert_eq!(
            err.to_string(),
            "Payload too large: 10 bytes exceeds limit of 5 bytes"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: XwebError = io_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("file missing"));
    }
}
