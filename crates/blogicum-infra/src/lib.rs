//! # Blogicum Infrastructure
//!
//! Concrete implementations of the ports defined in `blogicum-core`.
//! This crate contains the storage backends and the authentication services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory storage only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `rate-limit` - Rate limiting via governor

pub mod auth;
pub mod database;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, InMemoryStore};

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
