//! Local MCP HTTP server host utilities.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use axum::Router;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::server::core::N8nMcpCore;
use crate::server::services::WorkflowServices;

/// Default bind address for the streamable HTTP transport.
pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8765";

/// Host configuration for a local MCP HTTP server instance.
#[derive(Debug, Clone)]
pub struct McpHttpServer {
    bind_address: SocketAddr,
    services: Arc<WorkflowServices>,
}

impl McpHttpServer {
    /// Create a new MCP HTTP server bound to the provided address.
    pub fn new(bind_address: SocketAddr, services: Arc<WorkflowServices>) -> Self {
        Self { bind_address, services }
    }

    /// Start the server and return a handle for runtime inspection and shutdown.
    pub async fn start(self) -> Result<RunningMcpHttpServer> {
        let cancellation_token = CancellationToken::new();
        let services = Arc::clone(&self.services);
        let service: StreamableHttpService<N8nMcpCore, LocalSessionManager> = StreamableHttpService::new(
            move || Ok(N8nMcpCore::new(Arc::clone(&services))),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                stateful_mode: true,
                sse_keep_alive: None,
                cancellation_token: cancellation_token.child_token(),
                ..Default::default()
            },
        );

        let router = Router::new().nest_service("/mcp", service);
        let listener = tokio::net::TcpListener::bind(self.bind_address).await?;
        let bound_address = listener.local_addr()?;
        info!(address = %bound_address, "MCP HTTP server listening on /mcp");

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                if let Err(error) = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await
                {
                    warn!(error = %error, "MCP HTTP server stopped with an error");
                }
            }
        });

        Ok(RunningMcpHttpServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running MCP HTTP server.
#[derive(Debug)]
pub struct RunningMcpHttpServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningMcpHttpServer {
    /// Return the bound socket address for the running server.
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop the server and wait for in-flight requests to drain.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("MCP HTTP server task failed: {error}"))?;
        Ok(())
    }
}

/// Resolve a safe local bind address for the MCP HTTP server.
pub fn resolve_bind_address(bind_address: Option<&str>) -> Result<SocketAddr> {
    let address = bind_address.unwrap_or(DEFAULT_HTTP_BIND);
    let parsed: SocketAddr = address
        .parse()
        .map_err(|error| anyhow!("invalid MCP HTTP bind address '{address}': {error}"))?;
    if !is_loopback(parsed.ip()) {
        return Err(anyhow!("MCP HTTP server must bind to a loopback address"));
    }
    Ok(parsed)
}

fn is_loopback(address: IpAddr) -> bool {
    match address {
        IpAddr::V4(ip) => ip.is_loopback(),
        IpAddr::V6(ip) => ip.is_loopback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::services::tests::ScriptedApi;

    #[test]
    fn bind_address_defaults_to_local_port() {
        let address = resolve_bind_address(None).expect("default bind address");
        assert_eq!(address, "127.0.0.1:8765".parse::<SocketAddr>().expect("socket address"));
    }

    #[test]
    fn bind_address_accepts_ipv6_loopback() {
        assert!(resolve_bind_address(Some("[::1]:9000")).is_ok());
    }

    #[test]
    fn bind_address_rejects_non_loopback_hosts() {
        let error = resolve_bind_address(Some("0.0.0.0:8765")).expect_err("wildcard bind must fail");
        assert!(error.to_string().contains("loopback"));
        assert!(resolve_bind_address(Some("localhost")).is_err());
    }

    #[tokio::test]
    async fn server_binds_ephemeral_port_and_stops() {
        let services = Arc::new(WorkflowServices::new(ScriptedApi::with_responses(vec![])));
        let address = resolve_bind_address(Some("127.0.0.1:0")).expect("bind address");

        let running = McpHttpServer::new(address, services).start().await.expect("start server");

        let bound = running.bound_address();
        assert_ne!(bound.port(), 0);
        tokio::net::TcpStream::connect(bound).await.expect("server accepts connections");

        running.stop().await.expect("stop server");
        assert!(tokio::net::TcpStream::connect(bound).await.is_err());
    }
}
