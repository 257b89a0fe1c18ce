//! doorscan-api server binary.

use std::sync::Arc;

use tracing::{info, warn};

use doorscan_api::{
    build_router, metadata, storage::GcsObjectStore, telemetry, ApiKeys, AppState, ServerConfig,
};
use doorscan_db::{Database, PoolConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let log_settings = telemetry::LogSettings::from_env();
    let _file_guard = telemetry::init(&log_settings);
    info!(
        log_format = ?log_settings.format,
        log_file = log_settings.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env();

    // Project id for trace correlation
    let metadata = metadata::MetadataClient::new(&config.metadata_host)?;
    let project_id = metadata::resolve_project_id(config.project_id.as_deref(), &metadata).await;
    match metadata.region().await {
        Ok(region) => info!(region = %region, "Running in region"),
        Err(e) => warn!(error = %e, "Could not determine region"),
    }

    info!(database = %config.database.describe(), "Connecting to database");
    let pool_config = PoolConfig::new().max_connections(config.db_max_connections);
    let db = Database::connect_with_config(&config.database, pool_config).await?;
    info!("Connected to PostgreSQL database successfully");

    if config.run_migrations {
        db.migrate().await?;
        info!("Database migrations applied");
    }

    let storage = GcsObjectStore::new(config.gcs_bucket.clone(), metadata)?;
    info!(bucket = %storage.bucket(), "Object storage configured");

    let state = AppState {
        db: db.clone(),
        api_keys: Arc::new(ApiKeys::from_config(config.api_keys_json.as_deref())),
        storage: Arc::new(storage),
    };
    let app = build_router(state, &project_id, config.allowed_origins.as_deref());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_target()).await?;
    info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Database pool closed");
    Ok(())
}

/// Resolve on SIGTERM (Cloud Run stopping the instance) or Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Caught SIGTERM");
}
