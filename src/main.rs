//! crewlog - daily work log over chat
//!
//! A Rust backend implementing a per-chat conversation state machine for
//! collecting construction daily entries (task, timer, two confirmation
//! photos) and serving the admin review flow.

mod api;
mod backend;
mod photos;
mod runtime;
mod state_machine;
mod texts;
mod transport;

use api::{create_router, AppState};
use backend::BackendClient;
use photos::DiskPhotoStore;
use runtime::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewlog=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let backend_url =
        std::env::var("CREWLOG_BACKEND_URL").unwrap_or_else(|_| "http://web:8000".to_string());
    let transport_url = std::env::var("CREWLOG_TRANSPORT_URL")
        .unwrap_or_else(|_| "http://transport:8081".to_string());
    let photo_dir = std::env::var("CREWLOG_PHOTO_DIR").unwrap_or_else(|_| "photos".to_string());
    let session_ttl = std::env::var("CREWLOG_SESSION_TTL_SECS")
        .ok()
        .and_then(|secs| secs.parse().ok())
        .unwrap_or(DEFAULT_SESSION_TTL_SECS);
    let port: u16 = std::env::var("CREWLOG_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    std::fs::create_dir_all(&photo_dir)?;

    tracing::info!(
        backend = %backend_url,
        transport = %transport_url,
        photo_dir = %photo_dir,
        session_ttl_secs = session_ttl,
        "Configuration loaded"
    );

    // Wire up the session manager
    let sessions = Arc::new(SessionManager::new(
        BackendClient::new(backend_url),
        transport::HttpTransport::new(transport_url),
        DiskPhotoStore::new(photo_dir),
        Duration::from_secs(session_ttl),
    ));

    let state = AppState { sessions };
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("crewlog listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
