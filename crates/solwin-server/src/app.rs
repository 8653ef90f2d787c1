//! Router construction and the serve loop.

use axum::Router;
use axum::http::Method;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::ServerResult;
use crate::handlers::{embed_preflight, embed_script, health, latest_rate};
use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/rates/{state}", get(latest_rate))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        );

    Router::new()
        .route("/lib/embed.js", get(embed_script).options(embed_preflight))
        .route("/health", get(health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns [`ServerError::Io`](crate::ServerError::Io) if the address
/// cannot be bound or the server fails.
pub async fn run(addr: &str, state: AppState) -> ServerResult<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "Solar Window server started");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Solar Window server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Unable to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                error!(error = %err, "Unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
