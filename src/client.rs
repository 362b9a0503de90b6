//! Client
//!
//! Sends one request over a duplex byte channel and reads back exactly one
//! response. The client is transport independent: anything implementing
//! `Read + Write` will do.
//!
//! A client owns its channel for the duration of a call. Serializing calls
//! across a shared channel (one channel per in-flight call, or an external
//! multiplexer) is up to the integrator.

use std::io::{Read, Write};
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::protocol::{Codec, FrameCodec, Request, Response};

/// Anything that can call a remote method
pub trait Caller {
    fn call(&mut self, ctx: &Context, request: Request) -> Result<Response>;
}

/// relayrpc client over a duplex channel
pub struct Client<T> {
    /// Request is written to, and response read from, this channel
    transport: T,

    codec: Arc<dyn Codec>,
}

impl<T: Read + Write> Client<T> {
    /// Create a client using the default frame codec
    pub fn new(transport: T) -> Self {
        Self::with_codec(transport, Arc::new(FrameCodec::default()))
    }

    /// Create a client using a custom codec
    pub fn with_codec(transport: T, codec: Arc<dyn Codec>) -> Self {
        Self { transport, codec }
    }

    /// Call a remote method.
    ///
    /// If `ctx` carries a deadline, the request timeout is narrowed to the
    /// time remaining. Errors from the codec or the channel are returned as
    /// is; a returned [`Response`] may still carry a remote error.
    pub fn call(&mut self, ctx: &Context, mut request: Request) -> Result<Response> {
        request.headers.narrow_to(ctx.remaining());

        tracing::trace!(
            service = %request.service,
            method = request.method,
            timeout_ns = request.headers.timeout,
            "Sending request"
        );

        self.codec.write_request(&mut self.transport, &request)?;
        self.codec.read_response(&mut self.transport)
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the client, returning the channel
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: Read + Write> Caller for Client<T> {
    fn call(&mut self, ctx: &Context, request: Request) -> Result<Response> {
        Client::call(self, ctx, request)
    }
}
