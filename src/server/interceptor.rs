//! Server interceptors
//!
//! An interceptor wraps method execution. It receives the call and a
//! [`Next`] step and decides whether, when and how many times to run it,
//! which allows logic before, after or instead of the handler, and retries.
//!
//! Interceptors run in the order they were added to the server, outermost
//! first: interceptor 0 wraps interceptor 1 wraps ... wraps the handler.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;

use super::registry::{Handler, ServiceHandle};
use crate::context::Context;
use crate::error::{error_code, Result};

/// Details about a method call on the server side
#[derive(Clone)]
pub struct CallInfo {
    pub service: ServiceHandle,

    /// Composite method key, `<service>:<method>`
    pub method: String,

    pub body: Bytes,
}

impl fmt::Debug for CallInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallInfo")
            .field("method", &self.method)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}

/// Intercepts a call on the server side.
///
/// Implementations complete the call by running `next`, or return without
/// running it to short-circuit. Running it again repeats the rest of the
/// chain.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, ctx: &Context, call: &CallInfo, next: Next<'_>) -> Result<Bytes>;
}

/// Interceptor built from a closure, see [`interceptor_fn`]
pub struct FnInterceptor<F>(F);

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&Context, &CallInfo, Next<'_>) -> Result<Bytes> + Send + Sync,
{
    fn intercept(&self, ctx: &Context, call: &CallInfo, next: Next<'_>) -> Result<Bytes> {
        (self.0)(ctx, call, next)
    }
}

/// Build an interceptor from a closure
pub fn interceptor_fn<F>(f: F) -> FnInterceptor<F>
where
    F: Fn(&Context, &CallInfo, Next<'_>) -> Result<Bytes> + Send + Sync,
{
    FnInterceptor(f)
}

/// The remainder of the chain after the current interceptor.
///
/// `Next` is `Copy`: every run starts from the same position and executes
/// exactly the interceptors after the current one, then the handler.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    rest: &'a [Arc<dyn Interceptor>],
    call: &'a CallInfo,
    handler: &'a Handler,
}

impl<'a> Next<'a> {
    /// Run the next interceptor, or the handler if none are left
    pub fn run(self, ctx: &Context) -> Result<Bytes> {
        match self.rest.split_first() {
            Some((head, rest)) => head.intercept(
                ctx,
                self.call,
                Next {
                    rest,
                    call: self.call,
                    handler: self.handler,
                },
            ),
            None => (self.handler)(ctx, &self.call.service, self.call.body.clone()),
        }
    }
}

/// An ordered, immutable sequence of interceptors
#[derive(Clone)]
pub struct InterceptorChain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl InterceptorChain {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            interceptors: interceptors.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run `call` through every interceptor and finally `handler`
    pub fn run(&self, ctx: &Context, call: &CallInfo, handler: &Handler) -> Result<Bytes> {
        Next {
            rest: &self.interceptors,
            call,
            handler,
        }
        .run(ctx)
    }
}

impl Default for InterceptorChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

// =============================================================================
// Built-in Interceptors
// =============================================================================

/// Logs every call with its duration and resulting code
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl Interceptor for LoggingInterceptor {
    fn intercept(&self, ctx: &Context, call: &CallInfo, next: Next<'_>) -> Result<Bytes> {
        let start = Instant::now();
        let result = next.run(ctx);
        let code = error_code(&result);
        let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

        match &result {
            Ok(body) => tracing::info!(
                method = %call.method,
                elapsed_us,
                response_len = body.len(),
                "Call completed"
            ),
            Err(err) => tracing::info!(
                method = %call.method,
                elapsed_us,
                %code,
                error = %err,
                "Call failed"
            ),
        }

        result
    }
}
