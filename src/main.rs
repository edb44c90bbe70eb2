use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use carpool::config::environment::EnvironmentConfig;
use carpool::{create_app_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(if config.is_development() {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    info!("🚗 Campus Carpool client");
    info!("   data API:  {}", config.data_api_base_url);
    info!("   geocoding: {}", config.geocoding_base_url);
    info!("   routing:   {}", config.routing_base_url);
    if config.identity_api_key.is_empty() {
        error!("❌ IDENTITY_API_KEY is not set, sign-in will be rejected by the provider");
    }

    let addr: SocketAddr = config.server_url().parse()?;
    let state = AppState::from_config(config)?;
    state.start().await;

    let app = create_app_router(state.clone());

    info!("🌐 Listening on http://{}", addr);
    info!("   GET  /                 home");
    info!("   GET  /login /register  forms, POST to submit");
    info!("   GET  /search           rides (?start=&end=)");
    info!("   POST /publish/route    route and fare preview");
    info!("   POST /publish          publish a ride");
    info!("   GET  /requests         my requests");
    info!("   GET  /requests/events  request changes (SSE)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Server error: {}", e);
    }

    state.shutdown().await;
    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 Termination signal received, shutting down...");
        },
    }
}
