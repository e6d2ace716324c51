use std::sync::Arc;

use anyhow::Context;

use dao_ops_backend::api::{create_router, AppState};
use dao_ops_backend::arkiv::client::RpcLedger;
use dao_ops_backend::config::Config;
use dao_ops_backend::ipfs::IpfsService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env().context("invalid configuration")?;

    let ledger = Arc::new(
        RpcLedger::new(&config.arkiv_rpc_url, &config.arkiv_private_key)
            .context("failed to build Arkiv client")?,
    );
    log::info!("Arkiv wallet address: {}", ledger.address());
    log::info!("Arkiv RPC endpoint: {}", config.arkiv_rpc_url);

    let ipfs = Arc::new(IpfsService::new(&config.ipfs_api_url));
    ipfs.initialize().await?;

    let state = AppState {
        wallet_address: ledger.address().to_string(),
        ledger,
        files: ipfs.clone(),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    log::info!("DAO ops backend listening on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ipfs.stop().await;
    log::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
