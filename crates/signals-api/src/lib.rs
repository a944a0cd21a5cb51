//! HTTP API for the signals service.
//!
//! - `GET /api/health`: service metadata and tier summary
//! - `GET /api/signals`: tier-gated, rate-limited signal listing
//! - `GET /api/portfolio`: redacted portfolio snapshot
//! - `GET|POST /api/subscribe`: webhook subscription for Pro+ keys

mod error;
mod handlers;
mod middleware;
mod router;
mod state;

pub use error::ApiError;
pub use router::create_router;
pub use state::{AppState, ServiceInfo};

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Bind and serve until `shutdown` resolves.
pub async fn serve(
    router: Router,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Signals API listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
