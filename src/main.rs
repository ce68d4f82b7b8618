//! # Snippetbox Server
//!
//! Entry point: logging, configuration, state, background session cleanup,
//! then serve the router built by `snippetbox::routes::app`.

use snippetbox::config::Config;
use snippetbox::routes;
use snippetbox::state::AppState;
use tower_sessions::ExpiredDeletion;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default: info for dependencies, debug for this crate; RUST_LOG overrides
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,snippetbox=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let app_state = AppState::new(&config).await?;
    tracing::info!("Application state initialized");

    // Expired sessions are never read again but stay in the table until
    // something deletes them.
    let session_store = app_state.session_store();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            tracing::debug!("Running expired session cleanup");
            if let Err(e) = session_store.delete_expired().await {
                tracing::error!("Session cleanup failed: {:?}", e);
            }
        }
    });

    let app = routes::app(app_state);

    let bind_addr = config.bind_address();
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
