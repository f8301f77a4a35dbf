use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::db::food_queries;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub database: ComponentHealth,
    pub catalog: CatalogHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct CatalogHealth {
    pub status: String,
    pub vocabulary: usize,
    pub foods: usize,
}

/// GET /health — database reachability and catalog size.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();

    let db_check = match food_queries::ping(&state.db).await {
        Ok(_) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(_) => ComponentHealth {
            status: "error".to_string(),
            latency_ms: None,
        },
    };

    // Requests run on the in-memory snapshot, so an empty one is the real outage.
    let catalog = state.catalog.snapshot().await;
    let catalog_check = CatalogHealth {
        status: if catalog.is_empty() { "empty" } else { "ok" }.to_string(),
        vocabulary: catalog.vocabulary_len(),
        foods: catalog.food_count(),
    };

    let status_code = if catalog.is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let overall = if catalog.is_empty() {
        "unavailable"
    } else if db_check.status != "ok" {
        "degraded"
    } else {
        "ok"
    };

    let response = HealthResponse {
        status: overall.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            catalog: catalog_check,
        },
    };

    (status_code, Json(response))
}
