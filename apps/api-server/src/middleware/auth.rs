//! Authentication extractors.
//!
//! The token is read from `Authorization: Bearer <token>` first and from the
//! `auth_token` cookie second, so both API clients and browsers are covered.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::sync::Arc;

use blogicum_core::ports::{AuthError, TokenClaims, TokenService};
use uuid::Uuid;

use crate::middleware::error::{AppError, AppResult};

/// Cookie set by the login endpoint.
pub const AUTH_COOKIE: &str = "auth_token";

pub const STAFF_ROLE: &str = "staff";

/// Authenticated user identity extractor.
///
/// Handlers taking an `Identity` redirect anonymous requests to the login page:
/// ```ignore
/// async fn create_post(identity: Identity) -> AppResult<HttpResponse> {
///     // identity.user_id becomes the author
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Check if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn require_staff(&self) -> AppResult<()> {
        if self.has_role(STAFF_ROLE) {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.user_id, "Staff role required");
            Err(AppError::Forbidden)
        }
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

fn cookie_token(req: &HttpRequest) -> Option<String> {
    req.cookie(AUTH_COOKIE).map(|c| c.value().to_string())
}

/// Resolve the identity attached to a request, if any.
///
/// Expired or forged tokens count as anonymous.
fn authenticate(req: &HttpRequest) -> Result<Option<Identity>, AppError> {
    let token_service = req
        .app_data::<web::Data<Arc<dyn TokenService>>>()
        .ok_or_else(|| {
            tracing::error!("TokenService not found in app data");
            AppError::Internal("Server configuration error".to_string())
        })?;

    let Some(token) = bearer_token(req).or_else(|| cookie_token(req)) else {
        return Ok(None);
    };

    match token_service.validate_token(&token) {
        Ok(claims) => Ok(Some(Identity::from(claims))),
        Err(AuthError::TokenExpired) => {
            tracing::debug!("Expired token treated as anonymous");
            Ok(None)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected token treated as anonymous");
            Ok(None)
        }
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|identity| {
            identity.ok_or_else(|| AppError::LoginRequired {
                next: req.path().to_string(),
            })
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = authenticate(req).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Authentication unavailable");
            None
        });
        ready(Ok(OptionalIdentity(identity)))
    }
}
