use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hsorter_core::{
    load_config, validate_config, FeatureExtractor, LibrarySource, ProbeAdapter, SettingsStore,
    SqliteLibrary, SqliteSettings, SqliteStatsCache, StatsCache, StatsQuery, StatsRecomputer,
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH,
};
use hsorter_server::api::{create_router, WsBroadcaster};
use hsorter_server::recompute::RecomputeController;
use hsorter_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // All stores share one SQLite file
    let library: Arc<dyn LibrarySource> = Arc::new(
        SqliteLibrary::new(&config.database.path).context("Failed to open catalog tables")?,
    );
    info!("Catalog source initialized");

    let cache: Arc<dyn StatsCache> = Arc::new(
        SqliteStatsCache::new(&config.database.path)
            .context("Failed to create statistics cache")?,
    );
    info!("Statistics cache initialized");

    let settings: Arc<dyn SettingsStore> = Arc::new(
        SqliteSettings::new(&config.database.path).context("Failed to create settings store")?,
    );
    info!("Settings store initialized");

    // Probe backends
    let adapter = ProbeAdapter::from_config(&config.probe);
    let backends = adapter.backend_names().join(", ");
    if backends.is_empty() {
        warn!("No probe backends available, every file will report Unknown features");
    } else {
        info!("Probe backends: {}", backends);
    }
    let extractor = Arc::new(FeatureExtractor::new(adapter));

    let recomputer = Arc::new(StatsRecomputer::new(
        config.recompute.clone(),
        library,
        Arc::clone(&cache),
        Arc::clone(&settings),
        extractor,
    ));

    // Create WebSocket broadcaster for real-time updates
    let ws_broadcaster = WsBroadcaster::default();
    info!("WebSocket broadcaster initialized");

    let controller = RecomputeController::new(recomputer, ws_broadcaster.clone());
    let query = StatsQuery::new(Arc::clone(&cache), settings);

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        query,
        cache,
        controller,
        ws_broadcaster,
    ));

    if config.recompute.run_on_startup {
        info!("Starting recompute pass on startup");
        state.recompute().start().await;
    }

    // Create router
    let app = create_router(Arc::clone(&state));

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop a running pass; partitions it already wrote stay
    info!("Server shutting down...");
    if state.recompute().cancel().await {
        info!("Waiting for recompute pass to stop...");
        state.recompute().wait_idle().await;
        info!("Recompute pass stopped");
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
}
