//! Error Tests
//!
//! Tests for the mapping between errors, error codes and responses.

use std::fmt;
use std::io;

use relayrpc::{
    error_code, make_error, rpc_error, Coded, ContextError, ErrorCode, RegistrationError,
    Response, Result, RpcError,
};

/// Foreign error type reporting its own code
#[derive(Debug)]
struct QuotaExceeded;

impl fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("quota exceeded")
    }
}

impl Coded for QuotaExceeded {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::new(ErrorCode::FIRST_CUSTOM + 1)
    }
}

fn all_codes() -> Vec<ErrorCode> {
    vec![
        ErrorCode::UNKNOWN,
        ErrorCode::NOT_FOUND,
        ErrorCode::TIMEOUT,
        ErrorCode::new(ErrorCode::FIRST_CUSTOM),
        ErrorCode::new(u32::MAX),
    ]
}

// =============================================================================
// Error Code Mapping Tests
// =============================================================================

#[test]
fn test_error_code_of_success_is_ok() {
    let result: Result<()> = Ok(());
    assert_eq!(error_code(&result), ErrorCode::OK);
}

#[test]
fn test_deadline_exceeded_maps_to_timeout() {
    let err = RpcError::from(ContextError::DeadlineExceeded);
    assert_eq!(err.code(), ErrorCode::TIMEOUT);
    assert_eq!(err.to_string(), "context deadline exceeded");
}

#[test]
fn test_canceled_maps_to_unknown() {
    let err = RpcError::from(ContextError::Canceled);
    assert_eq!(err.code(), ErrorCode::UNKNOWN);
}

#[test]
fn test_uncoded_errors_map_to_unknown() {
    let errors = vec![
        RpcError::message("boom"),
        RpcError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "pipe")),
        RpcError::Serialization("bad".to_string()),
        RpcError::Protocol("bad frame".to_string()),
    ];
    for err in errors {
        assert_eq!(err.code(), ErrorCode::UNKNOWN, "{}", err);
        assert_eq!(error_code::<()>(&Err(err)), ErrorCode::UNKNOWN);
    }
}

#[test]
fn test_coded_error_reports_its_code() {
    let err = RpcError::Status {
        code: ErrorCode::NOT_FOUND,
        text: "missing".to_string(),
    };
    assert_eq!(err.code(), ErrorCode::NOT_FOUND);
}

#[test]
fn test_foreign_coded_error() {
    let err = RpcError::from_coded(&QuotaExceeded);
    assert_eq!(err.code(), ErrorCode::new(ErrorCode::FIRST_CUSTOM + 1));
    assert_eq!(err.to_string(), "quota exceeded");
}

#[test]
fn test_status_with_ok_code_is_still_an_error() {
    let err = RpcError::Status {
        code: ErrorCode::OK,
        text: "odd".to_string(),
    };
    assert_eq!(err.code(), ErrorCode::UNKNOWN);
}

// =============================================================================
// make_error Tests
// =============================================================================

#[test]
fn test_make_error_ok_is_none() {
    for text in ["", "ignored", "error text"] {
        assert!(make_error(ErrorCode::OK, text).is_none());
    }
}

#[test]
fn test_make_error_preserves_code_and_text() {
    for code in all_codes() {
        let err = make_error(code, "error text").unwrap();
        assert_eq!(err.code(), code);
        assert_eq!(err.to_string(), "error text");
    }
}

#[test]
fn test_make_error_formatted() {
    let err = rpc_error!(ErrorCode::NOT_FOUND, "method {}:{} not found", "x", 3).unwrap();
    assert_eq!(err.code(), ErrorCode::NOT_FOUND);
    assert_eq!(err.to_string(), "method x:3 not found");

    assert!(rpc_error!(ErrorCode::OK, "{}", 1).is_none());
}

// =============================================================================
// Response Conversion Tests
// =============================================================================

#[test]
fn test_error_to_response() {
    let err = RpcError::from(ContextError::DeadlineExceeded);
    let response = Response::from_error(&err);

    assert_eq!(response.error_code, err.code());
    assert_eq!(response.error_text, err.to_string());
    assert!(response.body.is_empty());
}

#[test]
fn test_error_round_trips_through_response() {
    let errors = vec![
        RpcError::message("plain"),
        RpcError::from(ContextError::DeadlineExceeded),
        RpcError::from_coded(&QuotaExceeded),
        make_error(ErrorCode::NOT_FOUND, "nope").unwrap(),
        RpcError::Io(io::Error::new(io::ErrorKind::Other, "disk")),
    ];

    for err in errors {
        let recovered = Response::from_error(&err).error().unwrap();
        assert_eq!(recovered.code(), err.code());
        assert_eq!(recovered.to_string(), err.to_string());
    }
}

#[test]
fn test_ok_response_has_no_error() {
    let response = Response {
        error_code: ErrorCode::OK,
        error_text: "ignored".to_string(),
        ..Response::default()
    };
    assert!(response.error().is_none());
    assert!(response.into_result().is_ok());
}

#[test]
fn test_error_response_into_result() {
    let response = relayrpc::error_response!(ErrorCode::TIMEOUT, "took {}ms", 10);
    let err = response.into_result().unwrap_err();

    assert_eq!(err.code(), ErrorCode::TIMEOUT);
    assert_eq!(err.to_string(), "took 10ms");
}

// =============================================================================
// Registration Error Tests
// =============================================================================

#[test]
fn test_registration_error_messages() {
    assert_eq!(RegistrationError::MissingName.to_string(), "missing service name");
    assert_eq!(RegistrationError::MissingService.to_string(), "missing service");
    assert_eq!(
        RegistrationError::DuplicateService("my-service".to_string()).to_string(),
        "service my-service already registered"
    );
}

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::OK.to_string(), "ok");
    assert_eq!(ErrorCode::NOT_FOUND.to_string(), "not found");
    assert_eq!(ErrorCode::new(99).to_string(), "code 99");
}
