//! PipeCD MCP server binary.
//!
//! Builds the HTTP backend client from the environment (and flags) and
//! serves MCP over stdio or Streamable HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use miette::Diagnostic;
use pipecd_mcp::config::{Config, ConfigError, ConfigOverrides, parse_timeout};
use pipecd_mcp::mcp::{serve_http, serve_stdio};
use pipecd_mcp::pipecd::{ClientError, HttpPipecdClient};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Error, Diagnostic, Debug)]
enum ServeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] ClientError),

    #[error("MCP transport error: {0}")]
    #[diagnostic(code(pipecd_mcp::binary::transport))]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// One session over stdin/stdout
    Stdio,
    /// Streamable HTTP
    Http,
}

#[derive(Parser)]
#[command(name = "pipecd-mcp")]
#[command(author, version, about = "MCP server for PipeCD", long_about = None)]
struct Cli {
    /// PipeCD control plane address, e.g. pipecd.example.com:443 (overrides PIPECD_HOST)
    #[arg(long)]
    host: Option<String>,

    /// File containing the API key (overrides PIPECD_API_KEY and PIPECD_API_KEY_FILE)
    #[arg(long)]
    api_key_file: Option<PathBuf>,

    /// Use plain HTTP to reach the control plane
    #[arg(long)]
    insecure: bool,

    /// Per-request timeout in seconds (overrides PIPECD_TIMEOUT)
    #[arg(long, value_parser = parse_timeout_arg)]
    timeout: Option<Duration>,

    /// MCP transport
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Address to listen on in HTTP mode
    #[arg(long, default_value = "127.0.0.1:3737")]
    listen: SocketAddr,

    /// Path the MCP endpoint is mounted at in HTTP mode
    #[arg(long, default_value = "/mcp", value_parser = parse_mount_path)]
    path: String,
}

fn parse_timeout_arg(value: &str) -> Result<Duration, String> {
    parse_timeout(value).map_err(|e| e.to_string())
}

fn parse_mount_path(value: &str) -> Result<String, String> {
    if value.starts_with('/') {
        Ok(value.to_string())
    } else {
        Err(format!("path must start with '/': {value}"))
    }
}

/// Initialize tracing subscriber with env filter.
///
/// Logs go to stderr: in stdio mode stdout carries the protocol.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipecd_mcp=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    run(cli).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), ServeError> {
    let config = Config::load(ConfigOverrides {
        host: cli.host,
        api_key_file: cli.api_key_file,
        insecure: cli.insecure,
        timeout: cli.timeout,
    })?;
    let client = HttpPipecdClient::new(&config)?;
    info!(base_url = %client.base_url(), "Using PipeCD control plane");

    match cli.transport {
        Transport::Stdio => serve_stdio::<HttpPipecdClient>(client).await?,
        Transport::Http => {
            let ct = CancellationToken::new();
            let shutdown = ct.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutting down");
                }
                shutdown.cancel();
            });

            serve_http::<HttpPipecdClient>(client, cli.listen, &cli.path, ct).await?;
        }
    }

    Ok(())
}
