use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mineruca_api::background;
use mineruca_api::config::ServerConfig;
use mineruca_api::notifications::NotificationRouter;
use mineruca_api::router::build_app_router;
use mineruca_api::search::start_session_sweeper;
use mineruca_api::state::AppState;
use mineruca_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    // LOG_FORMAT=json switches to one JSON object per line.
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mineruca_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // --- Configuration ---
    let config = Arc::new(ServerConfig::from_env());
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = mineruca_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    mineruca_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    mineruca_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    // --- WebSocket manager + heartbeat ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- Event bus + notification router ---
    let event_bus = Arc::new(mineruca_events::EventBus::default());
    let notification_router = NotificationRouter::new(pool.clone(), Arc::clone(&ws_manager));
    let router_handle = tokio::spawn(notification_router.run(event_bus.subscribe()));

    // --- App state ---
    let state = AppState::new(
        pool,
        Arc::clone(&config),
        Arc::clone(&ws_manager),
        Arc::clone(&event_bus),
    )
    .expect("Failed to build external service clients");

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let sweeper_handle = start_session_sweeper(Arc::clone(&state.search_sessions), cancel.clone());
    let cleanup_handle = tokio::spawn(background::session_cleanup::run(
        state.pool.clone(),
        cancel.clone(),
    ));
    tracing::info!(
        "Background tasks started (notification router, heartbeat, search sweeper, session cleanup)"
    );

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    cancel.cancel();
    let _ = tokio::time::timeout(grace, sweeper_handle).await;
    let _ = tokio::time::timeout(grace, cleanup_handle).await;

    // Dropping the last sender closes the channel and ends the router loop.
    drop(event_bus);
    let _ = tokio::time::timeout(grace, router_handle).await;
    tracing::info!("Notification router stopped");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;
    heartbeat_handle.abort();

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
