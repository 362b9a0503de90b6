//! Codec Tests
//!
//! Tests for envelope framing, encoding and decoding.

use std::io::Cursor;

use bytes::Bytes;
use relayrpc::protocol::{
    decode_request, decode_response, encode_request, encode_response, read_frame, write_frame,
    Codec, ErrorCode, FrameCodec, Request, RequestHeaders, Response, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
use relayrpc::RpcError;

fn sample_request() -> Request {
    Request {
        service: "service".to_string(),
        method: 3,
        headers: RequestHeaders { timeout: 1_000_000 },
        body: Bytes::from_static(b"request body"),
    }
}

// =============================================================================
// Envelope Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_request() {
    let request = sample_request();
    let encoded = encode_request(&request).unwrap();
    let decoded = decode_request(&encoded).unwrap();

    assert_eq!(decoded, request);
}

#[test]
fn test_encode_decode_error_response() {
    let response = Response::failure(ErrorCode::NOT_FOUND, "method x:3 not found");
    let encoded = encode_response(&response).unwrap();
    let decoded = decode_response(&encoded).unwrap();

    assert_eq!(decoded.error_code, ErrorCode::NOT_FOUND);
    assert_eq!(decoded.error_text, "method x:3 not found");
    assert!(decoded.body.is_empty());
}

#[test]
fn test_custom_error_code_survives_encoding() {
    let code = ErrorCode::new(ErrorCode::FIRST_CUSTOM + 7);
    let encoded = encode_response(&Response::failure(code, "custom")).unwrap();
    let decoded = decode_response(&encoded).unwrap();

    assert_eq!(decoded.error_code, code);
}

#[test]
fn test_frame_header_layout() {
    let encoded = encode_response(&Response::ok(Bytes::from_static(b"abc"))).unwrap();

    let payload_len = u32::from_be_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]);
    let crc = u32::from_be_bytes([encoded[4], encoded[5], encoded[6], encoded[7]]);

    assert_eq!(encoded.len(), HEADER_SIZE + payload_len as usize);
    assert_eq!(crc, crc32fast::hash(&encoded[HEADER_SIZE..]));
}

// =============================================================================
// Malformed Input Tests
// =============================================================================

#[test]
fn test_decode_incomplete_header() {
    let result = decode_request(&[0, 0, 0]);
    assert!(matches!(result, Err(RpcError::Io(_))));
}

#[test]
fn test_decode_incomplete_payload() {
    let mut encoded = encode_request(&sample_request()).unwrap();
    encoded.truncate(encoded.len() - 2);

    assert!(matches!(decode_request(&encoded), Err(RpcError::Io(_))));
}

#[test]
fn test_decode_corrupted_payload() {
    let mut encoded = encode_request(&sample_request()).unwrap();
    let last = encoded.len() - 1;
    encoded[last] ^= 0xff;

    match decode_request(&encoded) {
        Err(RpcError::Protocol(msg)) => assert!(msg.contains("CRC mismatch")),
        other => panic!("Expected CRC error, got {:?}", other),
    }
}

#[test]
fn test_decode_payload_too_large() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());

    match decode_request(&bytes) {
        Err(RpcError::Protocol(msg)) => assert!(msg.contains("too large")),
        other => panic!("Expected size error, got {:?}", other),
    }
}

#[test]
fn test_decode_garbage_payload_with_valid_checksum() {
    let mut bytes = Vec::new();
    write_frame(&mut bytes, &[0xff; 3]).unwrap();

    assert!(matches!(
        decode_request(&bytes),
        Err(RpcError::Serialization(_))
    ));
}

#[test]
fn test_decode_trailing_bytes() {
    let mut encoded = encode_request(&sample_request()).unwrap();
    encoded.push(0);

    assert!(matches!(decode_request(&encoded), Err(RpcError::Protocol(_))));
}

// =============================================================================
// Stream-based I/O Tests
// =============================================================================

#[test]
fn test_frames_are_self_delimiting() {
    let codec = FrameCodec::default();
    let mut buffer = Vec::new();
    codec
        .write_response(&mut buffer, &Response::ok(Bytes::from_static(b"first")))
        .unwrap();
    codec
        .write_response(&mut buffer, &Response::ok(Bytes::from_static(b"second")))
        .unwrap();

    let mut cursor = Cursor::new(buffer);
    let first = codec.read_response(&mut cursor).unwrap();
    let second = codec.read_response(&mut cursor).unwrap();

    assert_eq!(first.body, Bytes::from_static(b"first"));
    assert_eq!(second.body, Bytes::from_static(b"second"));
}

#[test]
fn test_codec_limit_applies_when_reading() {
    let codec = FrameCodec::new(16);
    let mut buffer = Vec::new();
    let request = Request::new("service", 1, vec![0u8; 64]);

    codec.write_request(&mut buffer, &request).unwrap();

    match codec.read_request(&mut Cursor::new(buffer)) {
        Err(RpcError::Protocol(msg)) => assert!(msg.contains("too large")),
        other => panic!("Expected size error, got {:?}", other),
    }
}

#[test]
fn test_read_frame_empty_payload() {
    let mut buffer = Vec::new();
    write_frame(&mut buffer, &[]).unwrap();

    let payload = read_frame(&mut Cursor::new(buffer), MAX_PAYLOAD_SIZE).unwrap();
    assert!(payload.is_empty());
}
