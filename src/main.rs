//! Social broker server.
//!
//! Main entry point that wires the crates together and starts the server.

use std::net::SocketAddr;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use social_api::{AppState, build_router};
use social_auth::jwt::JwtDecoder;
use social_core::config::AppConfig;
use social_core::error::AppError;
use social_database::DatabasePool;
use social_realtime::{ChatStore, MemoryChatStore, PgChatStore, RealtimeEngine};

#[tokio::main]
async fn main() {
    let env = std::env::var("SOCIAL_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    let (db_pool, store): (Option<DatabasePool>, Arc<dyn ChatStore>) =
        if config.database.is_memory() {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            let store: Arc<dyn ChatStore> = Arc::new(MemoryChatStore::new());
            (None, store)
        } else {
            let pool = DatabasePool::connect_and_migrate(&config.database).await?;
            let store: Arc<dyn ChatStore> = Arc::new(PgChatStore::new(&pool));
            (Some(pool), store)
        };

    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let engine = Arc::new(RealtimeEngine::new(config.realtime.clone(), store));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| AppError::configuration(format!("Invalid bind address: {e}")))?;
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = AppState::new(
        config,
        db_pool.clone(),
        jwt_decoder,
        Arc::clone(&engine),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(%addr, "Social broker listening");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .into_future(),
    );

    tokio::select! {
        finished = &mut server => {
            return match finished {
                Ok(result) => result.map_err(|e| AppError::internal(format!("Server error: {e}"))),
                Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
            };
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
        }
    }

    // Sessions hold their sockets open until told to stop.
    engine.shutdown();
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error during shutdown"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed"),
        Err(_) => tracing::warn!("Graceful shutdown timed out"),
    }

    if let Some(pool) = db_pool {
        pool.close().await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
