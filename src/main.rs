use anyhow::Context;
use clap::Parser;
use member_registry::registration::{build_backend, TracingNotifier};
use member_registry::{create_router, AppConfig, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    #[clap(long, default_value = "registry.toml")]
    config: String,

    /// Overrides `server.bind`
    #[clap(long)]
    bind: Option<String>,

    #[clap(long, env = "REGISTRY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = AppConfig::load(&args.config).context("load config")?;

    if let Some(bind) = args.bind {
        cfg.server.bind = bind;
    }
    if let Some(key) = args.api_key {
        cfg.registration.hosted.api_key = key;
    }

    let addr: SocketAddr = cfg.server.bind.parse().context("parse server.bind as SocketAddr")?;

    let backend = build_backend(&cfg.registration).context("build registration backend")?;
    info!("Using {:?} registration backend", cfg.registration.backend);

    let state = AppState::new(backend, Arc::new(TracingNotifier))
        .with_sessions(cfg.server.session_store());
    let app = create_router(state, cfg.server.max_body_bytes);

    let listener = TcpListener::bind(addr).await.context("bind listener")?;
    info!("Member registry listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve http")?;

    Ok(())
}
