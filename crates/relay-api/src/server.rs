//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. Timeout enforcement (health checks only)
//! 4. Handler execution
//!
//! Relay routes carry no server-side timeout. A webhook batch always runs to
//! completion and `/message` always answers 200; upstream calls are bounded
//! by the LINE client's own timeout instead.
//!
//! # Graceful Shutdown
//!
//! On SIGINT or SIGTERM the server stops accepting connections and lets
//! in-flight requests finish before `start_server` returns.

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{handlers, state::AppState};

/// Default timeout for health checks.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response header carrying the generated request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Creates the Axum router with all routes and middleware, using the
/// default request timeout.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use relay_api::{create_router, AppState};
/// use relay_core::storage::mock::MockHistoryStore;
/// use relay_line::mock::MockPlatform;
///
/// let state = AppState::new(Arc::new(MockHistoryStore::new()), Arc::new(MockPlatform::new()));
/// let app = create_router(state);
/// ```
pub fn create_router(state: AppState) -> Router {
    create_router_with_timeout(state, DEFAULT_REQUEST_TIMEOUT)
}

/// Creates the router with an explicit health check timeout.
pub fn create_router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/live", get(handlers::liveness_check))
        .layer(TimeoutLayer::new(request_timeout));

    let relay_routes = Router::new()
        .route("/history", get(handlers::query_history).post(handlers::receive_webhook))
        .route("/message", post(handlers::send_message));

    Router::new()
        .merge(health_routes)
        .merge(relay_routes)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject request ID into all responses.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Binds to the specified address and serves requests until a shutdown
/// signal is received.
///
/// # Errors
///
/// Returns `std::io::Error` if the address cannot be bound or the server
/// fails while running.
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    request_timeout: Duration,
) -> Result<(), std::io::Error> {
    let app = create_router_with_timeout(state, request_timeout);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Waiting for in-flight requests to complete");
}
