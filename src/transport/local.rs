//! In-process channel
//!
//! Connects a [`Client`](crate::Client) directly to a [`Server`] without
//! any I/O. Bytes written form the request; the first read serves it.

use std::io::{self, Cursor, Read, Write};

use crate::context::Context;
use crate::server::Server;

/// Channel that serves each written request on the given server
pub struct LocalChannel<'a> {
    server: &'a Server,

    /// Context handed to the server for every call
    ctx: Context,

    /// Request bytes written since the last response was produced
    inbound: Vec<u8>,

    /// Encoded response not yet read
    outbound: Cursor<Vec<u8>>,
}

impl<'a> LocalChannel<'a> {
    pub fn new(server: &'a Server, ctx: Context) -> Self {
        Self {
            server,
            ctx,
            inbound: Vec::new(),
            outbound: Cursor::new(Vec::new()),
        }
    }

    fn has_pending_output(&self) -> bool {
        (self.outbound.position() as usize) < self.outbound.get_ref().len()
    }

    fn serve_pending(&mut self) -> io::Result<()> {
        let request = std::mem::take(&mut self.inbound);
        let mut response = Vec::new();
        self.server
            .serve_one_shot(&self.ctx, &mut request.as_slice(), &mut response)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        self.outbound = Cursor::new(response);
        Ok(())
    }
}

impl Read for LocalChannel<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.has_pending_output() && !self.inbound.is_empty() {
            self.serve_pending()?;
        }
        self.outbound.read(buf)
    }
}

impl Write for LocalChannel<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
