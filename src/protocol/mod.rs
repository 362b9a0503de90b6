//! Protocol Module
//!
//! Defines the request/response envelope exchanged between client and server
//! and the codec that moves envelopes to and from bytes.
//!
//! ## Envelope
//! ```text
//! Request  { service: String, method: i64, headers: { timeout: u64 ns }, body: bytes }
//! Response { error_code: u32, error_text: String, body: bytes }
//! ```
//!
//! ## Frame Format (default codec)
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ CRC (4)  │   Payload (bincode envelope) │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Error Codes
//! - 0: OK
//! - 1: UNKNOWN
//! - 2: NOT_FOUND
//! - 3: TIMEOUT
//! - 64 and up: integrator-defined

mod request;
mod response;
mod codec;

pub use request::{Request, RequestHeaders};
pub use response::{ErrorCode, Response};
pub use codec::{
    Codec, FrameCodec,
    encode_request, decode_request, encode_response, decode_response,
    read_frame, write_frame,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
