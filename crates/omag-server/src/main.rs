use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use omag_core::{FileConfigStore, PlatformSecurity};
use omag_db::PlatformConnectorFactory;
use omag_server::config::PlatformConfig;
use omag_server::routes;
use omag_server::state::AppState;

/// User that starts the servers named in `OMAG_STARTUP_SERVERS` when no administrators
/// are configured.
const STARTUP_USER: &str = "OMAGServer";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("omag=info".parse()?))
        .with_target(false)
        .init();

    let config = PlatformConfig::from_env()?;
    let addr = format!("0.0.0.0:{}", config.port);

    let startup_user = config
        .admin_users
        .first()
        .cloned()
        .unwrap_or_else(|| STARTUP_USER.to_string());

    let state = Arc::new(AppState::new(
        Arc::new(FileConfigStore::new(&config.config_dir)),
        PlatformSecurity::new(config.admin_users.clone()),
        Arc::new(PlatformConnectorFactory::new()),
        config.api_key.clone(),
    ));

    for server_name in &config.startup_servers {
        match state
            .operations
            .activate_with_stored_config(&startup_user, server_name)
            .await
        {
            Ok(message) => tracing::info!("{message}"),
            Err(e) => tracing::error!(
                server = %server_name,
                error = %e,
                "Startup server failed to start"
            ),
        }
    }

    let app = routes::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!(
        config_dir = %config.config_dir.display(),
        secured = config.api_key.is_some(),
        "Starting OMAG server platform on {addr}"
    );
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.operations.shutdown_all().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
