//! Liveness plus a database round-trip.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::{OpenApi, ToSchema};

use crate::entities::SqliteStore;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthReport)))]
pub struct HealthApi;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    /// `ok` or `degraded`.
    pub status: String,
    /// `ok` or `unavailable`.
    pub database: String,
    pub version: String,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server and database are up", body = HealthReport),
        (status = 503, description = "Database is unreachable", body = HealthReport)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    check(&state.store).await
}

async fn check(store: &SqliteStore) -> (StatusCode, Json<HealthReport>) {
    let (code, status, database) = match store.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "ok"),
        Err(e) => {
            warn!(error = %e, "health check: database unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
        }
    };
    let report = HealthReport {
        status: status.to_owned(),
        database: database.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    };
    (code, Json(report))
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn live_store_is_healthy() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let (code, Json(report)) = check(&store).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(report.status, "ok");
        assert_eq!(report.database, "ok");
        assert!(!report.version.is_empty());
    }

    #[tokio::test]
    async fn closed_store_is_degraded() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.close().await;
        let (code, Json(report)) = check(&store).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, "degraded");
        assert_eq!(report.database, "unavailable");
    }
}
