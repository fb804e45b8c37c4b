//! Liveness and readiness probes.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::observability::RequestId;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl HealthResponse {
    fn with_status(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id: None,
        }
    }
}

/// GET /api/health
pub async fn health_check(request_id: RequestId) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        request_id: Some(request_id.as_str().to_string()),
        ..HealthResponse::with_status("ok")
    })
}

/// GET /api/health/ready - the content store answers a read.
pub async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    match state.content.categories_with_counts().await {
        Ok(_) => HttpResponse::Ok().json(HealthResponse::with_status("ready")),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(HealthResponse::with_status("unavailable"))
        }
    }
}
