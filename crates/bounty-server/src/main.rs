mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use bounty_api::{AppStateInner, Orchestrator};
use bounty_backup::KvStore;
use bounty_chain::RpcChainReader;
use bounty_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bounty_server=debug,bounty_api=debug,bounty_chain=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Stores
    let db = Arc::new(Database::open(&config.db_path)?);
    let backup = Arc::new(KvStore::open(&config.backup_path)?);
    info!(
        "Primary store at {}, backup store at {}",
        config.db_path.display(),
        config.backup_path.display()
    );

    // Chain
    let chain = RpcChainReader::new(config.chain, &config.rpc_url)?;
    match tokio::time::timeout(config.io_timeout, chain.check_chain_id()).await {
        Ok(Ok(true)) => info!("Connected to {} via {}", chain.chain(), config.rpc_url),
        Ok(Ok(false)) => {}
        Ok(Err(e)) => warn!("Could not reach {} at startup: {}", config.rpc_url, e),
        Err(_) => warn!("{} did not answer within {:?}", config.rpc_url, config.io_timeout),
    }
    info!("Bounty contract {:?}", config.contract);

    let orchestrator = Orchestrator::new(
        Arc::new(chain),
        db.clone(),
        backup,
        config.contract,
        config.io_timeout,
    );
    let state = Arc::new(AppStateInner {
        store: db,
        orchestrator,
        io_timeout: config.io_timeout,
    });

    let app = bounty_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Bounty server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down");
    }
}
