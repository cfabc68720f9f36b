//! Error types for the input bridge.

use thiserror::Error;

/// Result type alias for inputbridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can surface from the platform boundary.
///
/// Lookups of detached devices and missing vibrators are not errors; those
/// come back as `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// The platform input service cannot be reached.
    #[error("input service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Platform-specific failure (enumeration, listener attach, vibration).
    #[error("platform error: {0}")]
    Platform(String),

    /// The operation requires elevated permissions.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Thread-related error.
    #[error("thread error: {0}")]
    ThreadError(String),

    /// The requested feature is not supported by this platform or device.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// A string could not be parsed as a `source/id/name` device qualifier.
    #[error("invalid device qualifier: {0}")]
    InvalidQualifier(String),

    /// I/O error from a platform backend.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors.
    #[error("{0}")]
    Other(String),
}
