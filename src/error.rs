//! Error types for relayrpc
//!
//! Provides a unified error type for all per-call operations, the mapping
//! between errors and wire-level [`ErrorCode`]s, and a separate error type for
//! registration-time misconfiguration.

use std::fmt;

use thiserror::Error;

use crate::context::ContextError;
use crate::protocol::ErrorCode;

/// Result type alias using RpcError
pub type Result<T> = std::result::Result<T, RpcError>;

/// Unified error type for relayrpc operations
#[derive(Debug, Error)]
pub enum RpcError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Call Errors
    // -------------------------------------------------------------------------
    /// Cancellation or deadline expiry of the call's context.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// An error carrying an explicit error code.
    #[error("{text}")]
    Status { code: ErrorCode, text: String },

    /// A plain error without a code. Maps to [`ErrorCode::UNKNOWN`].
    #[error("{0}")]
    Message(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for RpcError {
    fn from(err: bincode::Error) -> Self {
        RpcError::Serialization(err.to_string())
    }
}

/// Capability of an error to report its own [`ErrorCode`].
pub trait Coded {
    fn error_code(&self) -> ErrorCode;
}

impl Coded for RpcError {
    fn error_code(&self) -> ErrorCode {
        match self {
            RpcError::Context(ContextError::DeadlineExceeded) => ErrorCode::TIMEOUT,
            // An error value never reports success.
            RpcError::Status { code, .. } if !code.is_ok() => *code,
            _ => ErrorCode::UNKNOWN,
        }
    }
}

impl RpcError {
    /// The error code this error maps to on the wire.
    pub fn code(&self) -> ErrorCode {
        self.error_code()
    }

    /// Build a plain message error.
    pub fn message(text: impl Into<String>) -> Self {
        RpcError::Message(text.into())
    }

    /// Lift a foreign error that reports its own code.
    ///
    /// A foreign error reporting [`ErrorCode::OK`] is lifted as
    /// [`ErrorCode::UNKNOWN`].
    pub fn from_coded<E: Coded + fmt::Display + ?Sized>(err: &E) -> Self {
        let code = err.error_code();
        RpcError::Status {
            code: if code.is_ok() { ErrorCode::UNKNOWN } else { code },
            text: err.to_string(),
        }
    }
}

/// Determine the error code of a call result. `Ok` maps to [`ErrorCode::OK`].
pub fn error_code<T>(result: &Result<T>) -> ErrorCode {
    match result {
        Ok(_) => ErrorCode::OK,
        Err(err) => err.code(),
    }
}

/// Build an error with the given code and text.
///
/// Returns `None` when `code` is [`ErrorCode::OK`], whatever the text.
pub fn make_error(code: ErrorCode, text: impl Into<String>) -> Option<RpcError> {
    if code.is_ok() {
        return None;
    }
    Some(RpcError::Status {
        code,
        text: text.into(),
    })
}

/// Formatted variant of [`make_error`].
///
/// ```
/// use relayrpc::{rpc_error, ErrorCode};
///
/// let err = rpc_error!(ErrorCode::NOT_FOUND, "user {} missing", 7).unwrap();
/// assert_eq!(err.to_string(), "user 7 missing");
/// ```
#[macro_export]
macro_rules! rpc_error {
    ($code:expr, $($arg:tt)*) => {
        $crate::error::make_error($code, ::std::format!($($arg)*))
    };
}

// =============================================================================
// Registration Errors
// =============================================================================

/// Misconfiguration detected while registering a service.
///
/// These are programming errors, kept apart from the per-call taxonomy and
/// never encoded into a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("missing service name")]
    MissingName,

    #[error("missing service")]
    MissingService,

    #[error("service {0} already registered")]
    DuplicateService(String),
}
