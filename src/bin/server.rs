//! relayrpc One-Shot Server Binary
//!
//! Serves exactly one request read from stdin and writes the response to
//! stdout. Logs go to stderr.

use std::io::{self, BufReader, BufWriter};
use std::time::Duration;

use bytes::Bytes;
use clap::Parser;
use relayrpc::{Config, Context, ErrorCode, RpcError, Server, ServiceSpec};
use tracing_subscriber::{fmt, EnvFilter};

/// Rejected method argument
const INVALID_ARGUMENT: ErrorCode = ErrorCode::new(ErrorCode::FIRST_CUSTOM);

/// Demo service state
struct Echo {
    prefix: String,
}

/// relayrpc one-shot server
#[derive(Parser, Debug)]
#[command(name = "relayrpc-oneshot")]
#[command(about = "Serve a single relayrpc request from stdin to stdout")]
#[command(version)]
struct Args {
    /// Log every call
    #[arg(long)]
    log_calls: bool,

    /// Maximum payload size in MB
    #[arg(short = 'm', long, default_value = "16")]
    max_payload_mb: u32,

    /// Prefix prepended by the echo method
    #[arg(long, default_value = "")]
    prefix: String,
}

fn main() {
    // Initialize tracing/logging; stdout carries the response
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,relayrpc=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("relayrpc one-shot server v{}", relayrpc::VERSION);

    let config = Config::builder()
        .log_calls(args.log_calls)
        .max_payload_size(args.max_payload_mb.saturating_mul(1024 * 1024))
        .build();

    let mut server = match Server::builder().config(config).build() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    server.register(echo_service(args.prefix));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = BufWriter::new(stdout.lock());

    if let Err(e) = server.serve_one_shot(&Context::background(), &mut reader, &mut writer) {
        tracing::error!("Failed to write response: {}", e);
        std::process::exit(1);
    }
}

/// Service `echo`:
/// - 1: returns the body with the configured prefix
/// - 2: returns the body upper-cased
/// - 3: sleeps for the number of milliseconds in the body, honoring the deadline
fn echo_service(prefix: String) -> ServiceSpec {
    ServiceSpec::new("echo", Echo { prefix })
        .method(1, |_ctx, svc, body| {
            let echo = svc
                .downcast_ref::<Echo>()
                .ok_or_else(|| RpcError::message("echo: unexpected service value"))?;
            let mut out = echo.prefix.clone().into_bytes();
            out.extend_from_slice(&body);
            Ok(Bytes::from(out))
        })
        .method(2, |_ctx, _svc, body| Ok(Bytes::from(body.to_ascii_uppercase())))
        .method(3, |ctx, _svc, body| {
            let millis: u64 = std::str::from_utf8(&body)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .ok_or_else(|| RpcError::Status {
                    code: INVALID_ARGUMENT,
                    text: "invalid sleep duration".to_string(),
                })?;
            match ctx.wait_timeout(Duration::from_millis(millis)) {
                Some(err) => Err(err.into()),
                None => Ok(Bytes::from_static(b"slept")),
            }
        })
}
