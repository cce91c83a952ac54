//! Souffleur rehearsal coordinator server entry point.

use std::error::Error;
use std::sync::Arc;

use souffleur_api::config::Config;
use souffleur_api::gateway::SessionGateway;
use souffleur_api::routes;
use souffleur_api::state::AppState;
use souffleur_core::clock::{Clock, SystemClock};
use souffleur_sync::{RepositorySync, TokioProcessRunner};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .json()
        .init();

    tracing::info!("Starting Souffleur server");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // The sync task runs for the life of the process.
    let _sync = RepositorySync::new(
        config.sync.clone(),
        clock.clone(),
        Arc::new(TokioProcessRunner),
    )
    .spawn();

    let gateway = Arc::new(SessionGateway::new(config.director_password.clone(), clock));
    let app = routes::app(AppState::new(gateway));

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
