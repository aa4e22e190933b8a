//! SimpleJSON HTTP surface.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::Result;
use crate::metrics::MetricContext;

mod auth;
mod handlers;

pub use auth::AuthPolicy;

/// Build the router with the auth gate applied to every route.
pub fn build_router(ctx: MetricContext, auth: AuthPolicy) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/search", get(handlers::search).post(handlers::search))
        .route("/query", post(handlers::query))
        .with_state(Arc::new(ctx))
        .layer(middleware::from_fn_with_state(
            Arc::new(auth),
            auth::require_auth,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener fails while accepting connections.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "datasource listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("datasource stopped");
    Ok(())
}
