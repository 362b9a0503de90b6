//! Request definitions
//!
//! Represents a method invocation sent by a client.

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Per-request metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeaders {
    /// Call timeout in nanoseconds. Zero means no explicit timeout.
    pub timeout: u64,
}

impl RequestHeaders {
    /// The timeout as a duration, or `None` when unset
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout != 0).then(|| Duration::from_nanos(self.timeout))
    }

    /// Narrow the timeout to the caller's remaining time.
    ///
    /// The timeout becomes the smaller of the current header value and
    /// `remaining`. An unset header takes `remaining`. A missing or
    /// non-positive `remaining` leaves the header untouched.
    pub fn narrow_to(&mut self, remaining: Option<Duration>) {
        let Some(remaining) = remaining else {
            return;
        };
        let nanos = u64::try_from(remaining.as_nanos()).unwrap_or(u64::MAX);
        if nanos > 0 && (self.timeout == 0 || nanos < self.timeout) {
            self.timeout = nanos;
        }
    }
}

/// A request to call a service method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Name of a registered service
    pub service: String,

    /// Method id, unique within the service
    pub method: i64,

    pub headers: RequestHeaders,

    /// Serialized method argument
    pub body: Bytes,
}

impl Request {
    /// Create a request without headers
    pub fn new(service: impl Into<String>, method: i64, body: impl Into<Bytes>) -> Self {
        Self {
            service: service.into(),
            method,
            headers: RequestHeaders::default(),
            body: body.into(),
        }
    }

    /// Set an explicit timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.headers.timeout = u64::try_from(timeout.as_nanos()).unwrap_or(u64::MAX);
        self
    }
}
