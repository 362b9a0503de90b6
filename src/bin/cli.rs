//! relayrpc CLI Client
//!
//! Spawns a one-shot server process, sends it a single request over its
//! stdin/stdout and prints the response.

use std::process::{Command, ExitCode, Stdio};
use std::time::Duration;

use clap::{Parser, Subcommand};
use relayrpc::transport::Duplex;
use relayrpc::{Client, Context, Request};
use tracing_subscriber::{fmt, EnvFilter};

/// relayrpc CLI
#[derive(Parser, Debug)]
#[command(name = "relayrpc-cli")]
#[command(about = "CLI for calling a relayrpc one-shot server")]
struct Args {
    /// Server executable, spawned once per call
    #[arg(short, long, default_value = "relayrpc-oneshot")]
    exec: String,

    /// Call deadline in milliseconds (0 = none)
    #[arg(short, long, default_value = "0")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Call a method
    Call {
        /// Service name
        service: String,

        /// Method id
        method: i64,

        /// Request body
        #[arg(default_value = "")]
        body: String,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let Commands::Call {
        service,
        method,
        body,
    } = args.command;

    let mut child = match Command::new(&args.exec)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            eprintln!("Failed to start {}: {}", args.exec, e);
            return ExitCode::FAILURE;
        }
    };

    let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
        eprintln!("Failed to open pipes to {}", args.exec);
        return ExitCode::FAILURE;
    };

    let root = Context::background();
    let (ctx, _guard) = match args.timeout_ms {
        0 => root.with_cancel(),
        ms => root.with_timeout(Duration::from_millis(ms)),
    };

    let mut client = Client::new(Duplex::new(stdout, stdin));
    let result = client.call(&ctx, Request::new(service, method, body.into_bytes()));

    // Closing stdin lets the server exit if it is still reading.
    drop(client);
    let _ = child.wait();

    match result {
        Ok(response) if response.is_ok() => {
            println!("{}", String::from_utf8_lossy(&response.body));
            ExitCode::SUCCESS
        }
        Ok(response) => {
            eprintln!("Error ({}): {}", response.error_code, response.error_text);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Call failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
