//! Response definitions
//!
//! Represents the outcome of a call and the error codes it can carry.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{make_error, Result, RpcError};

/// Wire-level error code
///
/// Zero is success. Codes below [`ErrorCode::FIRST_CUSTOM`] are reserved;
/// integrators define their own with [`ErrorCode::new`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(u32);

impl ErrorCode {
    pub const OK: ErrorCode = ErrorCode(0);
    pub const UNKNOWN: ErrorCode = ErrorCode(1);
    /// No such service or method
    pub const NOT_FOUND: ErrorCode = ErrorCode(2);
    /// Deadline exceeded
    pub const TIMEOUT: ErrorCode = ErrorCode(3);

    /// First value available for integrator-defined codes
    pub const FIRST_CUSTOM: u32 = 64;

    pub const fn new(code: u32) -> Self {
        ErrorCode(code)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for ErrorCode {
    fn from(code: u32) -> Self {
        ErrorCode(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ErrorCode::OK => f.write_str("ok"),
            ErrorCode::UNKNOWN => f.write_str("unknown"),
            ErrorCode::NOT_FOUND => f.write_str("not found"),
            ErrorCode::TIMEOUT => f.write_str("timeout"),
            ErrorCode(code) => write!(f, "code {}", code),
        }
    }
}

/// The response to a request
///
/// `body` is only meaningful when `error_code` is OK; `error_text` only
/// when it is not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub error_code: ErrorCode,

    pub error_text: String,

    /// Serialized method result
    pub body: Bytes,
}

impl Response {
    /// Create a successful response
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            error_code: ErrorCode::OK,
            error_text: String::new(),
            body: body.into(),
        }
    }

    /// Create a failed response with the given code and text
    pub fn failure(code: ErrorCode, text: impl Into<String>) -> Self {
        Self {
            error_code: code,
            error_text: text.into(),
            body: Bytes::new(),
        }
    }

    /// Create a response describing `err`
    pub fn from_error(err: &RpcError) -> Self {
        Self::failure(err.code(), err.to_string())
    }

    /// Whether the call succeeded
    pub fn is_ok(&self) -> bool {
        self.error_code.is_ok()
    }

    /// The error this response carries, if any
    pub fn error(&self) -> Option<RpcError> {
        make_error(self.error_code, self.error_text.as_str())
    }

    /// The body on success, the carried error otherwise
    pub fn into_result(self) -> Result<Bytes> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(self.body),
        }
    }
}

/// Build a failed [`Response`] with a formatted error text.
#[macro_export]
macro_rules! error_response {
    ($code:expr, $($arg:tt)*) => {
        $crate::protocol::Response::failure($code, ::std::format!($($arg)*))
    };
}
