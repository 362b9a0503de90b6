//! # relayrpc
//!
//! A transport-independent RPC envelope and dispatch layer with:
//! - A request/response envelope and a closed set of error codes
//! - A client that performs one round trip over any duplex byte channel
//! - Deadline negotiation between the caller's context and the request timeout
//! - A server that routes requests to registered handlers through interceptors
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐   Request bytes    ┌──────────────────────────────────┐
//! │    Client    │ ─────────────────▶ │        Server (one-shot)         │
//! │ (deadline →  │                    │  decode → resolve <svc>:<method> │
//! │   timeout)   │ ◀───────────────── │  → interceptors → handler        │
//! └──────────────┘   Response bytes   │  → encode                        │
//!        ▲                            └──────────────────────────────────┘
//!        │            transport (external: sockets, pipes, ...)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod context;

pub mod protocol;
pub mod client;
pub mod server;
pub mod transport;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{error_code, make_error, Coded, RegistrationError, Result, RpcError};
pub use config::Config;
pub use context::{CancelGuard, Context, ContextError};
pub use protocol::{ErrorCode, Request, RequestHeaders, Response};
pub use client::{Caller, Client};
pub use server::{CallInfo, Interceptor, MethodSpec, Next, Server, ServiceSpec};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of relayrpc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
