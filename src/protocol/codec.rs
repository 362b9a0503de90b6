//! Protocol codec
//!
//! Encoding and decoding of envelopes to and from byte streams.
//!
//! ## Wire Format
//!
//! Every envelope travels in one self-delimiting frame:
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (4)  │ CRC (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! - Len: payload length, big endian
//! - CRC: CRC32 of the payload, big endian
//! - Payload: bincode encoding of a [`Request`] or [`Response`]

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Request, Response};
use crate::error::{Result, RpcError};

/// Header size: 4 bytes length + 4 bytes checksum
pub const HEADER_SIZE: usize = 8;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Codec Trait
// =============================================================================

/// Moves envelopes between values and byte streams
///
/// A decode call must consume exactly one envelope from the source, and
/// must fail on malformed input.
pub trait Codec: Send + Sync {
    fn write_request(&self, writer: &mut dyn Write, request: &Request) -> Result<()>;

    fn read_request(&self, reader: &mut dyn Read) -> Result<Request>;

    fn write_response(&self, writer: &mut dyn Write, response: &Response) -> Result<()>;

    fn read_response(&self, reader: &mut dyn Read) -> Result<Response>;
}

/// Default codec: length-prefixed, checksummed bincode frames
///
/// `max_payload_size` bounds the frames this codec reads. Frames it writes
/// are limited only by the `u32` length field.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_payload_size: u32,
}

impl FrameCodec {
    pub fn new(max_payload_size: u32) -> Self {
        Self { max_payload_size }
    }

    pub fn max_payload_size(&self) -> u32 {
        self.max_payload_size
    }

    fn write<T: Serialize>(&self, writer: &mut dyn Write, value: &T) -> Result<()> {
        let payload = bincode::serialize(value)?;
        write_frame(writer, &payload)
    }

    fn read<T: DeserializeOwned>(&self, reader: &mut dyn Read) -> Result<T> {
        let payload = read_frame(reader, self.max_payload_size)?;
        Ok(bincode::deserialize(&payload)?)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(MAX_PAYLOAD_SIZE)
    }
}

impl Codec for FrameCodec {
    fn write_request(&self, writer: &mut dyn Write, request: &Request) -> Result<()> {
        self.write(writer, request)
    }

    fn read_request(&self, reader: &mut dyn Read) -> Result<Request> {
        self.read(reader)
    }

    fn write_response(&self, writer: &mut dyn Write, response: &Response) -> Result<()> {
        self.write(writer, response)
    }

    fn read_response(&self, reader: &mut dyn Read) -> Result<Response> {
        self.read(reader)
    }
}

fn payload_too_large(len: usize, max: u32) -> RpcError {
    RpcError::Protocol(format!(
        "Payload too large: {} bytes (max {})",
        len, max
    ))
}

// =============================================================================
// Envelope Encoding/Decoding
// =============================================================================

/// Encode a request to a complete frame
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    encode(request)
}

/// Decode a request from a complete frame
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    decode(bytes)
}

/// Encode a response to a complete frame
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    encode(response)
}

/// Decode a response from a complete frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    decode(bytes)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut message = Vec::new();
    FrameCodec::default().write(&mut message, value)?;
    Ok(message)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut reader = bytes;
    let value = FrameCodec::default().read(&mut reader)?;
    if !reader.is_empty() {
        return Err(RpcError::Protocol(format!(
            "Trailing bytes after frame: {}",
            reader.len()
        )));
    }
    Ok(value)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one frame and return its verified payload
///
/// Blocks until a complete frame is received or an error occurs
pub fn read_frame<R: Read + ?Sized>(reader: &mut R, max_payload_size: u32) -> Result<Vec<u8>> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let expected_crc = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    // Validate payload length before allocating
    if payload_len > max_payload_size {
        return Err(payload_too_large(payload_len as usize, max_payload_size));
    }

    let mut payload = vec![0u8; payload_len as usize];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    let actual_crc = crc32fast::hash(&payload);
    if actual_crc != expected_crc {
        return Err(RpcError::Protocol(format!(
            "CRC mismatch: expected {:#010x}, got {:#010x}",
            expected_crc, actual_crc
        )));
    }

    Ok(payload)
}

/// Write one frame around `payload` and flush
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| {
        RpcError::Protocol(format!("Payload too large: {} bytes", payload.len()))
    })?;

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.extend_from_slice(&payload_len.to_be_bytes());
    message.extend_from_slice(&crc32fast::hash(payload).to_be_bytes());
    message.extend_from_slice(payload);

    writer.write_all(&message)?;
    writer.flush()?;
    Ok(())
}
