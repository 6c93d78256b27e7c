//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (body size limit, CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `BOOK_ENABLE_SWAGGER=false`)
//! - Health / heartbeat route
//! - `/assessment` routes (session authenticated)

pub mod assessment;
pub mod doc;
mod health;

use crate::middleware::{cors, trace};
use crate::state::AppState;
use axum::{Router, middleware};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use utoipa_swagger_ui::SwaggerUi;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .nest("/assessment", assessment::router(state.clone()));

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Layers added last run first on the way in.
        .layer(RequestBodyLimitLayer::new(state.config.max_body_bytes))
        .layer(cors::cors_layer(&state.config))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
