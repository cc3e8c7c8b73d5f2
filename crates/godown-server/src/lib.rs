pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use godown_core::config::GodownConfig;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(config: GodownConfig) -> Router {
    let app_state = state::AppState::new(config);
    build_router_with_state(app_state)
}

pub fn build_router_with_state(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        // Chat — the conversational decision pipeline
        .route("/api/chat", post(routes::chat::chat))
        // Direct persistence access
        .route("/api/facilities", get(routes::facilities::list_facilities))
        .route("/api/facilities", post(routes::facilities::create_facility))
        .route("/api/lots", get(routes::lots::list_lots))
        .route("/api/alerts", get(routes::alerts::list_alerts))
        .route("/api/summary", get(routes::summary::get_summary))
        .layer(cors)
        .with_state(app_state)
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// Start the godown API server.
pub async fn serve(config: GodownConfig, port: u16) -> anyhow::Result<()> {
    let router = build_router(config);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("godown server listening on http://{addr}");
    axum::serve(listener, router).await?;
    Ok(())
}
