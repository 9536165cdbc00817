//! Health check endpoints.
//!
//! Used by load balancers and orchestration systems to decide whether the
//! server should receive traffic.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "parcel-api";

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status: "ok" or "degraded".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Current timestamp (RFC 3339).
    pub timestamp: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentHealth>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ComponentHealth {
    /// Parcel store status.
    pub store: ComponentStatus,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ComponentStatus {
    /// Status: "ok" or "unavailable".
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Create health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/livez", get(livez))
}

/// Is the process up? Does not check dependencies.
async fn healthz() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        components: None,
    })
}

/// Can the server reach its store? Returns 503 if not.
async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let store_result = state.store().health_check().await;
    let store_ok = store_result.is_ok();

    let components = ComponentHealth {
        store: ComponentStatus {
            status: if store_ok { "ok" } else { "unavailable" }.to_string(),
            message: store_result.err().map(|e| e.to_string()),
        },
    };

    let response = HealthResponse {
        status: if store_ok { "ok" } else { "degraded" }.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        components: Some(components),
    };

    if store_ok {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parcel_id::PublicIdCodec;

    use crate::db::MemoryParcelStore;

    #[tokio::test]
    async fn test_healthz_returns_ok() {
        let response = healthz().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_livez_returns_ok() {
        let response = livez().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readyz_with_memory_store() {
        let state = AppState::new(
            Arc::new(MemoryParcelStore::new()),
            PublicIdCodec::new("salt", 5),
        );
        let response = readyz(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
