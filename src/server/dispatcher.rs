//! Dispatcher
//!
//! Routes decoded requests to registered handlers.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use super::interceptor::{
    interceptor_fn, CallInfo, Interceptor, InterceptorChain, LoggingInterceptor, Next,
};
use super::registry::{MethodKey, MethodTable, Registry, ServiceSpec};
use crate::config::Config;
use crate::context::Context;
use crate::error::{RegistrationError, Result, RpcError};
use crate::error_response;
use crate::protocol::{Codec, ErrorCode, FrameCodec, Request, Response};

/// relayrpc server
///
/// Transport independent: the network layer feeds it requests through
/// [`Server::execute`] or byte streams through [`Server::serve_one_shot`].
///
/// Registration takes `&mut self` and dispatch `&self`, so all services are
/// registered before the server is shared for concurrent dispatch.
pub struct Server {
    methods: MethodTable,
    chain: InterceptorChain,
    codec: Arc<dyn Codec>,
}

impl Server {
    /// Create a server with default configuration and no interceptors
    pub fn new() -> Self {
        Self {
            methods: MethodTable::default(),
            chain: InterceptorChain::default(),
            codec: Arc::new(FrameCodec::default()),
        }
    }

    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Register a service.
    ///
    /// # Panics
    ///
    /// Panics if the service spec has no name or no service value, or if a service
    /// with the same name was already registered. See [`Server::try_register`]
    /// for a non-panicking variant.
    pub fn register(&mut self, spec: ServiceSpec) {
        if let Err(e) = self.try_register(spec) {
            panic!("{}", e);
        }
    }

    /// Register a service, reporting misconfiguration as an error
    pub fn try_register(&mut self, spec: ServiceSpec) -> std::result::Result<(), RegistrationError> {
        let name = spec.name.clone();
        let method_count = spec.methods.len();
        self.methods.insert(spec)?;
        tracing::debug!(service = %name, methods = method_count, "Registered service");
        Ok(())
    }

    /// Whether a service with this name is registered
    pub fn has_service(&self, name: &str) -> bool {
        self.methods.has_service(name)
    }

    /// Number of registered methods across all services
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Execute a single request.
    ///
    /// Never fails: an unknown method or a handler error is reported in the
    /// returned response.
    pub fn execute(&self, ctx: &Context, request: Request) -> Response {
        let key = MethodKey::new(request.service, request.method);
        let Some(method) = self.methods.get(&key) else {
            tracing::debug!(method = %key, "Method not found");
            return error_response!(ErrorCode::NOT_FOUND, "method {} not found", key);
        };

        let call = CallInfo {
            service: Arc::clone(&method.service),
            method: key.to_string(),
            body: request.body,
        };

        tracing::trace!(method = %call.method, timeout_ns = request.headers.timeout, "Dispatching call");

        let result = match request.headers.timeout {
            0 => self.chain.run(ctx, &call, &method.handler),
            timeout => {
                // The guard cancels the derived context on every path out.
                let (ctx, _guard) = ctx.with_timeout(Duration::from_nanos(timeout));
                self.chain.run(&ctx, &call, &method.handler)
            }
        };

        match result {
            Ok(body) => Response::ok(body),
            Err(e) => Response::from_error(&e),
        }
    }

    /// Serve one request read from `reader`, writing the response to
    /// `writer`.
    ///
    /// Only fails if no response can be written. Every other failure,
    /// including a malformed request, is encoded in the response. A response
    /// the codec refuses to encode is replaced by an `UNKNOWN` response
    /// carrying the encode error.
    pub fn serve_one_shot(
        &self,
        ctx: &Context,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let response = match self.codec.read_request(reader) {
            Ok(request) => self.execute(ctx, request),
            Err(e) => {
                tracing::warn!("Failed to decode request: {}", e);
                error_response!(ErrorCode::UNKNOWN, "decode request: {}", e)
            }
        };

        match self.codec.write_response(writer, &response) {
            // The sink may already hold a partial frame.
            Err(e @ RpcError::Io(_)) => Err(e),
            Err(e) => {
                tracing::warn!("Failed to encode response: {}", e);
                let fallback = error_response!(ErrorCode::UNKNOWN, "encode response: {}", e);
                self.codec.write_response(writer, &fallback)
            }
            Ok(()) => Ok(()),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for Server {
    fn register(&mut self, spec: ServiceSpec) {
        Server::register(self, spec)
    }
}

/// Builder for Server
#[derive(Default)]
pub struct ServerBuilder {
    config: Config,
    interceptors: Vec<Arc<dyn Interceptor>>,
    codec: Option<Arc<dyn Codec>>,
}

impl ServerBuilder {
    /// Set the server configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Add an interceptor. Interceptors run in the order they are added.
    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Add an interceptor built from a closure
    pub fn interceptor_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Context, &CallInfo, Next<'_>) -> Result<Bytes> + Send + Sync + 'static,
    {
        self.interceptor(interceptor_fn(f))
    }

    /// Use a custom codec for [`Server::serve_one_shot`]
    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn build(self) -> Result<Server> {
        if self.config.max_payload_size == 0 {
            return Err(RpcError::Config(
                "max_payload_size must be greater than zero".to_string(),
            ));
        }

        let mut interceptors = Vec::with_capacity(self.interceptors.len() + 1);
        if self.config.log_calls {
            interceptors.push(Arc::new(LoggingInterceptor) as Arc<dyn Interceptor>);
        }
        interceptors.extend(self.interceptors);

        let codec = self
            .codec
            .unwrap_or_else(|| Arc::new(FrameCodec::new(self.config.max_payload_size)) as Arc<dyn Codec>);

        Ok(Server {
            methods: MethodTable::default(),
            chain: InterceptorChain::new(interceptors),
            codec,
        })
    }
}
