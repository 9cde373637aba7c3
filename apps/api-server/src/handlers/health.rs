//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

/// Health check endpoint - returns server status.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    #[allow(unused_mut)]
    let mut status = "ok";

    #[cfg(feature = "postgres")]
    if let Some(db) = &state.db {
        if let Err(e) = db.main.ping().await {
            tracing::error!(error = %e, "Database ping failed");
            status = "degraded";
        }
    }

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage_backend(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if status == "ok" {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
