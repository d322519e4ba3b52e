//! Liveness endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::PgPool;

/// What `/health` reports on.
#[derive(Clone, Default)]
pub struct HealthState {
    /// Present when running against PostgreSQL.
    pub pool: Option<PgPool>,
}

pub async fn health(State(state): State<HealthState>) -> Json<Value> {
    let (storage, storage_ok) = match &state.pool {
        Some(pool) => {
            let ok = sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(pool)
                .await
                .is_ok();
            ("postgres", ok)
        }
        None => ("memory", true),
    };

    let status = if storage_ok { "healthy" } else { "degraded" };
    Json(json!({
        "status": status,
        "storage": storage,
        "storage_ok": storage_ok,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now(),
    }))
}

pub fn health_router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}
