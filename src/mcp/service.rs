//! MCP transports
//!
//! The server runs either over stdio (one session, for clients that spawn
//! the process) or as a Streamable HTTP service nested into an Axum router.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use rmcp::{
    ServiceExt,
    transport::{
        stdio,
        streamable_http_server::{
            StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
        },
    },
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::pipecd::PipecdClient;

use super::server::PipecdServer;

/// Create MCP Streamable HTTP service
///
/// Every session gets its own [`PipecdServer`]; all of them share `client`.
///
/// # Example
/// ```no_run
/// use axum::Router;
/// use tokio_util::sync::CancellationToken;
/// # use pipecd_mcp::config::Config;
/// # use pipecd_mcp::mcp::create_mcp_service;
/// # use pipecd_mcp::pipecd::HttpPipecdClient;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpPipecdClient::new(&Config::from_env()?)?;
///
/// let ct = CancellationToken::new();
/// let mcp_service = create_mcp_service::<HttpPipecdClient>(client, ct);
///
/// let app: Router = Router::new().nest_service("/mcp", mcp_service);
/// # Ok(())
/// # }
/// ```
pub fn create_mcp_service<C: PipecdClient + 'static>(
    client: impl Into<Arc<C>>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<PipecdServer<C>, LocalSessionManager> {
    let client: Arc<C> = client.into();

    // Returns io::Error to match rmcp's expected factory signature
    let service_factory = move || -> Result<PipecdServer<C>, std::io::Error> {
        Ok(PipecdServer::new(Arc::clone(&client)))
    };

    let mut config = StreamableHttpServerConfig::default();
    config.sse_keep_alive = None; // Use default (15s)
    config.sse_retry = None;
    config.stateful_mode = true;
    config.cancellation_token = cancellation_token;

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}

/// Serve a single MCP session over stdin/stdout until the client disconnects.
pub async fn serve_stdio<C: PipecdClient + 'static>(
    client: impl Into<Arc<C>>,
) -> Result<(), std::io::Error> {
    let server = PipecdServer::<C>::new(client);

    info!("Serving MCP over stdio");
    let running = server
        .serve(stdio())
        .await
        .map_err(std::io::Error::other)?;
    let reason = running.waiting().await.map_err(std::io::Error::other)?;
    info!(?reason, "MCP stdio session ended");

    Ok(())
}

/// Serve MCP over Streamable HTTP at `path` until `ct` is cancelled.
pub async fn serve_http<C: PipecdClient + 'static>(
    client: impl Into<Arc<C>>,
    listen: SocketAddr,
    path: &str,
    ct: CancellationToken,
) -> Result<(), std::io::Error> {
    let service = create_mcp_service::<C>(client, ct.child_token());
    // axum refuses to nest at the root
    let app = if path == "/" {
        Router::new().fallback_service(service)
    } else {
        Router::new().nest_service(path, service)
    }
    .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("MCP server listening on http://{}{}", listener.local_addr()?, path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { ct.cancelled_owned().await })
        .await
}
