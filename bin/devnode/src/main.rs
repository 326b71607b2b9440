//! Local stand-in for the SeaWolf node RPC and wallet daemon

mod config;
mod constants;
mod handlers;
mod ledger;
mod node;
mod rpc;
mod state;

use actix_web::{web, App, HttpServer};
use config::ServerConfig;
use state::AppState;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Keep actix worker chatter out of the default output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "info,actix_server::worker=warn,actix_server::accept=warn",
                )
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting devnode (PID: {})", std::process::id());

    let config = ServerConfig::load()?;
    let state = web::Data::new(AppState::new(&config));

    let rpc_address = config.rpc_address();
    let rpc_state = state.clone();
    let rpc_server = HttpServer::new(move || {
        App::new()
            .app_data(rpc_state.clone())
            .service(handlers::rpc::rpc)
            .service(handlers::health::health)
    })
    .bind(&rpc_address)
    .map_err(|e| {
        error!("Failed to bind RPC listener to {}: {}", rpc_address, e);
        e
    })?;
    info!("Node RPC listening on http://{}/rpc", rpc_address);

    let wallet_address = config.wallet_address();
    let wallet_state = state.clone();
    let wallet_server = HttpServer::new(move || {
        App::new()
            .app_data(wallet_state.clone())
            .service(handlers::wallet::balance)
            .service(handlers::wallet::account)
            .service(handlers::wallet::transfer)
            .service(handlers::health::health)
    })
    .bind(&wallet_address)
    .map_err(|e| {
        error!("Failed to bind wallet listener to {}: {}", wallet_address, e);
        e
    })?;
    info!("Wallet listening on http://{}", wallet_address);

    tokio::try_join!(
        rpc_server.workers(1).run(),
        wallet_server.workers(1).run()
    )?;
    Ok(())
}
