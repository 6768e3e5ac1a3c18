use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use n8n_mcp::{DEFAULT_HTTP_BIND, McpHttpServer, WorkflowServices, resolve_bind_address, serve_stdio};
use n8n_mcp_api::{ConfigOverrides, N8nClient, N8nConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

/// MCP tool server for n8n workflows.
///
/// Connection settings come from N8N_BASE, N8N_API_KEY and N8N_TIMEOUT_SECS;
/// flags take precedence over the environment.
#[derive(Debug, Parser)]
#[command(name = "n8n-mcp", version, about)]
struct Args {
    /// Base URL of the n8n instance (overrides N8N_BASE).
    #[arg(long)]
    base_url: Option<String>,

    /// n8n API key (overrides N8N_API_KEY).
    #[arg(long)]
    api_key: Option<String>,

    /// Per-request timeout in seconds (overrides N8N_TIMEOUT_SECS).
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Loopback address for the HTTP transport.
    #[arg(long, default_value = DEFAULT_HTTP_BIND)]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = resolve_config(&args)?;
    info!(base_url = %config.base_url(), timeout_secs = config.timeout().as_secs(), "starting n8n MCP server");
    let client = N8nClient::new(&config).context("failed to build n8n API client")?;
    let services = Arc::new(WorkflowServices::new(Arc::new(client)));

    match args.transport {
        Transport::Stdio => serve_stdio(services).await,
        Transport::Http => {
            let bind_address = resolve_bind_address(Some(&args.bind))?;
            let running = McpHttpServer::new(bind_address, services).start().await?;
            tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
            info!("shutting down MCP HTTP server");
            running.stop().await
        }
    }
}

/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_config(args: &Args) -> Result<N8nConfig> {
    let overrides = ConfigOverrides {
        base_url: args.base_url.clone(),
        api_key: args.api_key.clone(),
        timeout: args.timeout_secs.map(Duration::from_secs),
    };
    N8nConfig::resolve(overrides).context("invalid n8n configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use n8n_mcp_api::{API_KEY_ENV, BASE_URL_ENV, TIMEOUT_ENV};

    #[test]
    fn defaults_to_stdio_on_local_port() {
        let args = Args::try_parse_from(["n8n-mcp"]).expect("parse args");
        assert_eq!(args.transport, Transport::Stdio);
        assert_eq!(args.bind, "127.0.0.1:8765");
    }

    #[test]
    fn flags_override_environment() {
        temp_env::with_vars(
            [
                (BASE_URL_ENV, Some("http://env.example:5678")),
                (API_KEY_ENV, Some("env-key")),
                (TIMEOUT_ENV, Some("10")),
            ],
            || {
                let args = Args::try_parse_from([
                    "n8n-mcp",
                    "--base-url",
                    "https://flag.example/",
                    "--timeout-secs",
                    "3",
                    "--transport",
                    "http",
                ])
                .expect("parse args");
                let config = resolve_config(&args).expect("config");

                assert_eq!(args.transport, Transport::Http);
                assert_eq!(config.base_url(), "https://flag.example");
                assert_eq!(config.api_key(), "env-key");
                assert_eq!(config.timeout(), Duration::from_secs(3));
            },
        );
    }

    #[test]
    fn flags_replace_invalid_environment_values() {
        temp_env::with_vars([(BASE_URL_ENV, Some("not a url")), (TIMEOUT_ENV, Some("soon"))], || {
            let args = Args::try_parse_from(["n8n-mcp", "--base-url", "http://ok.example", "--timeout-secs", "5"]).expect("parse args");
            let config = resolve_config(&args).expect("flags win over bad env");

            assert_eq!(config.base_url(), "http://ok.example");
            assert_eq!(config.timeout(), Duration::from_secs(5));
        });
    }

    #[test]
    fn invalid_environment_fails_without_flags() {
        temp_env::with_vars([(BASE_URL_ENV, None), (TIMEOUT_ENV, Some("soon"))], || {
            let args = Args::try_parse_from(["n8n-mcp"]).expect("parse args");
            assert!(resolve_config(&args).is_err());
        });
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        temp_env::with_vars_unset([BASE_URL_ENV, API_KEY_ENV, TIMEOUT_ENV], || {
            let args = Args::try_parse_from(["n8n-mcp", "--timeout-secs", "0"]).expect("parse args");
            assert!(resolve_config(&args).is_err());
        });
    }
}
