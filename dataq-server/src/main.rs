//! dataq-server
//!
//! Unified entry point: loads the agent configuration, wires the dispatcher,
//! and serves the A2A and MCP front-ends over the same core. A SIGHUP
//! reloads the configuration; in-flight requests keep the snapshot they
//! started with.

use anyhow::{Context, Result};
use clap::Parser;
use dataq_a2a::A2aServer;
use dataq_agents::{AgentRegistry, Dispatcher, RegistryHandle};
use dataq_core::{AdapterSet, AgentsConfig};
use dataq_llm::{client_from_env, SqlGenerationAdapter};
use dataq_mcp::{HttpTransport, McpServer, StdioTransport, Transport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "dataq-server")]
#[command(about = "Natural language to SQL agent platform (A2A + MCP)")]
struct Args {
    /// Agent configuration: a YAML file or a directory of YAML files
    #[arg(short, long, env = "DATAQ_CONFIG", default_value = "config/agents.yaml")]
    config: PathBuf,

    /// A2A bind address (host:port)
    #[arg(long, default_value = "0.0.0.0:8080")]
    a2a_bind: String,

    /// MCP HTTP bind address (host:port)
    #[arg(long, default_value = "0.0.0.0:8081")]
    mcp_bind: String,

    /// Host name advertised in the agent card URL
    #[arg(long, default_value = "localhost")]
    public_host: String,

    /// Serve MCP over stdio instead of running the HTTP servers
    #[arg(long)]
    stdio: bool,

    /// Disable the A2A front-end
    #[arg(long)]
    no_a2a: bool,

    /// Disable the MCP front-end
    #[arg(long)]
    no_mcp: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dataq_core::load_environment();

    let args = Args::parse();

    // RUST_LOG wins; --log-level is the fallback. Logs go to stderr so the
    // stdio transport keeps stdout for protocol traffic.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AgentsConfig::load_path(&args.config)
        .with_context(|| format!("failed to load agent config from {}", args.config.display()))?;
    let registry = AgentRegistry::load(config).context("agent configuration rejected")?;
    let registry = Arc::new(RegistryHandle::new(registry));

    let llm = client_from_env().context("failed to configure LLM provider")?;
    let mut adapters = AdapterSet::new();
    adapters.register_all(Arc::new(SqlGenerationAdapter::new(llm.clone())));

    let dispatcher = Arc::new(Dispatcher::new(registry.clone(), llm, adapters));

    if args.stdio {
        // stdio owns stdout, so it is the only front-end in this mode
        return StdioTransport::new()
            .serve(Arc::new(McpServer::new(dispatcher)))
            .await;
    }

    let mut servers = tokio::task::JoinSet::new();

    if !args.no_a2a {
        let port = port_of(&args.a2a_bind)?;
        let server = A2aServer::new(dispatcher.clone(), args.public_host.clone(), port);
        let bind = args.a2a_bind.clone();
        servers.spawn(async move { server.serve(&bind).await });
    }

    if !args.no_mcp {
        let transport = HttpTransport::new(args.mcp_bind.clone());
        let handler = Arc::new(McpServer::new(dispatcher.clone()));
        servers.spawn(async move { transport.serve(handler).await });
    }

    if servers.is_empty() {
        anyhow::bail!("both front-ends disabled, nothing to serve");
    }

    #[cfg(unix)]
    spawn_reload_task(args.config.clone(), registry);

    // the first server to exit brings the process down
    match servers.join_next().await {
        Some(result) => result.context("server task panicked")?,
        None => Ok(()),
    }
}

fn port_of(bind_addr: &str) -> Result<u16> {
    bind_addr
        .rsplit_once(':')
        .and_then(|(_, port)| port.parse().ok())
        .with_context(|| format!("invalid bind address: {bind_addr}"))
}

/// Reload the agent configuration on SIGHUP. A bad config is logged and
/// discarded; the running registry is never replaced with a broken one.
#[cfg(unix)]
fn spawn_reload_task(config_path: PathBuf, registry: Arc<RegistryHandle>) {
    tokio::spawn(async move {
        let mut hangup = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())
        {
            Ok(signal) => signal,
            Err(e) => {
                error!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };

        while hangup.recv().await.is_some() {
            info!(path = %config_path.display(), "Reloading agent configuration");
            let reloaded = AgentsConfig::load_path(&config_path)
                .and_then(AgentRegistry::load);
            match reloaded {
                Ok(new_registry) => registry.replace(new_registry).await,
                Err(e) => error!(error = %e, "Reload rejected, keeping current registry"),
            }
        }
    });
}
