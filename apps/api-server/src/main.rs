//! # Blogicum API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use blogicum_core::ports::{PasswordService, TokenService};
use blogicum_infra::{Argon2PasswordService, JwtTokenService};

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Blogicum API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(config.database.as_ref()).await;

    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

    if let Some(staff) = &config.bootstrap_staff {
        if let Err(e) = state.ensure_staff_account(staff, password_service.as_ref()).await {
            tracing::error!(error = %e, "Failed to create bootstrap staff account");
        }
    }

    #[cfg(feature = "rate-limit")]
    let rate_limiter: Option<Arc<dyn blogicum_core::ports::RateLimiter>> =
        match blogicum_infra::InMemoryRateLimiter::new(config.rate_limit.clone()) {
            Ok(limiter) => Some(Arc::new(limiter)),
            Err(e) => {
                tracing::error!(error = %e, "Invalid rate limit configuration, limiting disabled");
                None
            }
        };

    let state = web::Data::new(state);
    let token_service = web::Data::new(token_service);
    let password_service = web::Data::new(password_service);
    #[cfg(feature = "rate-limit")]
    let rate_limiter = rate_limiter.map(web::Data::new);

    HttpServer::new(move || {
        let app = App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .app_data(token_service.clone())
            .app_data(password_service.clone());

        #[cfg(feature = "rate-limit")]
        let app = match &rate_limiter {
            Some(limiter) => app.app_data(limiter.clone()),
            None => app,
        };

        app.configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
