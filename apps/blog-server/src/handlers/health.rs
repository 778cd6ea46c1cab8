//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use blogger_core::domain::PageRequest;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// Whether the post store answered.
    pub storage: &'static str,
}

/// GET /health
///
/// Checks the store with a one-item listing; a failing store answers 503.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let check = state.content.list_posts(PageRequest::new(1, 1)).await;

    let (status, storage) = match &check {
        Ok(_) => ("ok", "ok"),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            ("degraded", "unavailable")
        }
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        storage,
    };

    if check.is_ok() {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
