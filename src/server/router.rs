use axum::{
    Json, Router,
    extract::Request,
    middleware,
    routing::get,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::{cors::cors_middleware, handlers::handle_proxy, state::AppState};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "request",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            path = %request.uri().path(),
        )
    });

    Router::new()
        .route("/proxy", get(handle_proxy))
        .route("/api/proxy", get(handle_proxy))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(cors_middleware))
        .layer(trace)
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
