//! HTTP services
//!
//! Two small services meant to be deployed side by side: [`backend`] serves
//! a JSON payload and [`frontend`] renders a page from it.

pub mod backend;
pub mod frontend;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;

/// Default listen address of the backend
pub const BACKEND_ADDR: &str = "127.0.0.1:8081";

/// Default listen address of the frontend
pub const FRONTEND_ADDR: &str = "127.0.0.1:8080";

/// Serve `app` on `addr` until the process is stopped
pub async fn serve(name: &str, addr: &str, app: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {} to {}", name, addr))?;
    tracing::info!(service = name, address = %addr, "Listening");

    axum::serve(listener, app)
        .await
        .with_context(|| format!("{} stopped unexpectedly", name))
}
