use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router};
use http::HeaderValue;
use stresslens_ai::JournalAnalyzer;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes;

/// Origins of the local web frontend dev server.
pub const DEFAULT_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

/// Build the router with CORS, request tracing and the shared analyzer.
pub fn create_app(analyzer: Arc<JournalAnalyzer>, origins: &[String]) -> anyhow::Result<Router> {
    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(?origins, "allowing origins");

    // Credentials rule out `*`, so methods and headers mirror the preflight.
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    Ok(routes::create_router()
        .layer(Extension(analyzer))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Serve `app` until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    tracing::info!(local_addr = %listener.local_addr()?, "starting app");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = &error as &dyn std::error::Error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
