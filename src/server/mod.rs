//! Server Module
//!
//! Service registration and request dispatch.
//!
//! ## Dispatch
//! - Resolve `<service>:<method>` in the method table
//! - Bound the context by the request timeout, if any
//! - Run the call through the interceptor chain to the handler
//! - Build a success or error response

mod dispatcher;
mod interceptor;
mod registry;

pub use dispatcher::{Server, ServerBuilder};
pub use interceptor::{
    interceptor_fn, CallInfo, FnInterceptor, Interceptor, InterceptorChain, LoggingInterceptor,
    Next,
};
pub use registry::{Handler, MethodKey, MethodSpec, Registry, ServiceHandle, ServiceSpec};
