//! Transport layer for the Meridian MCP server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::info;

use crate::config::TransportType;
use crate::mcp::http::create_router;
use crate::mcp::session::SessionRegistry;
use crate::mcp::MeridianServer;

/// Run the MCP server with stdio transport.
pub async fn run_stdio(server: MeridianServer) -> Result<()> {
    info!("Starting Meridian MCP server with stdio transport");

    let service = server.serve(stdio()).await?;

    info!("Meridian MCP server running...");
    service.waiting().await?;

    info!("Meridian MCP server shutting down");
    Ok(())
}

/// Run the MCP server with the session-multiplexed HTTP transport.
pub async fn run_http(server: MeridianServer, port: u16) -> Result<()> {
    info!(
        "Starting Meridian MCP server with HTTP transport on port {}",
        port
    );

    let registry = Arc::new(SessionRegistry::new());
    let app = create_router(server, registry);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Meridian MCP server listening on http://{}", addr);
    info!("MCP endpoint available at /mcp");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    info!("Meridian MCP server shutting down");
    Ok(())
}

/// Run the MCP server with the configured transport.
pub async fn run_server(
    server: MeridianServer,
    transport: TransportType,
    port: u16,
) -> Result<()> {
    match transport {
        TransportType::Stdio => run_stdio(server).await,
        TransportType::Http => run_http(server, port).await,
    }
}
