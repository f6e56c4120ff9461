//! HTTP API for Spendwise
//!
//! An axum router over the service layer. Every route except the health
//! check requires a bearer token; errors are rendered by the `IntoResponse`
//! impl in [`error`].

pub mod auth;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod validate;

use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

pub use state::AppState;

use crate::config::Settings;
use crate::error::{SpendError, SpendResult};

fn cors_layer(settings: &Settings) -> SpendResult<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(60 * 60));

    if settings.cors_allowed_origins.is_empty() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = settings
        .cors_allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| SpendError::Config(format!("Invalid CORS origin '{}'", origin)))
        })
        .collect::<SpendResult<Vec<_>>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

/// Build the application router
pub fn router(state: AppState) -> SpendResult<Router> {
    let cors = cors_layer(&state.settings)?;

    Ok(routes::api_routes()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(state: AppState) -> SpendResult<()> {
    let address = state.settings.socket_addr();
    let app = router(state)?;

    info!("Binding to {address}");
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| SpendError::Io(format!("Failed to bind {}: {}", address, e)))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SpendError::Io(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
