//! Serve command - runs the directory API

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::create_router;
use crate::config::AppConfig;
use crate::infrastructure::auth::RevocationSweeper;
use crate::infrastructure::logging;

/// Run the API server until SIGINT or SIGTERM
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    let state = crate::create_app_state(&config).await?;
    let sweeper = RevocationSweeper::spawn(state.revocations.clone(), config.auth.sweep_interval());
    let app = create_router(state);

    let addr = build_socket_addr(&config)?;
    info!(%addr, "Starting directory server");

    let listener = TcpListener::bind(addr).await?;

    serve_until(listener, app, sweeper, shutdown_signal()).await?;
    info!("Server shutdown complete");

    Ok(())
}

/// Serve until `shutdown` resolves, then stop the sweeper whatever the outcome
async fn serve_until(
    listener: TcpListener,
    app: Router,
    sweeper: RevocationSweeper,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    sweeper.stop().await;

    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
