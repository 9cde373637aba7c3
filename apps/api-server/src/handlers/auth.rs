//! Authentication handlers.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, web};
use std::sync::Arc;

use blogicum_core::domain::{ProfileChanges, Registration, User};
use blogicum_core::ports::{BaseRepository, PasswordService, TokenService};
use blogicum_core::validation::ValidationErrors;
use blogicum_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest};

use crate::middleware::auth::AUTH_COOKIE;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn auth_cookie(token: &str, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Issue a token for `user`, both in the body and as a cookie.
fn token_response(
    mut response: actix_web::HttpResponseBuilder,
    token_service: &dyn TokenService,
    user: &User,
) -> AppResult<HttpResponse> {
    let token = token_service
        .generate_token(user.id, &user.username, user.roles())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let expires_in = token_service.expiration_seconds();

    Ok(response
        .cookie(auth_cookie(&token, expires_in))
        .json(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: expires_in.max(0) as u64,
        }))
}

/// POST /auth/registration/
pub async fn registration(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let registration = Registration {
        profile: ProfileChanges {
            first_name: req.first_name,
            last_name: req.last_name,
            username: req.username,
            email: req.email,
        },
        password: req.password,
    }
    .cleaned()?;

    if state
        .users
        .find_by_username(&registration.profile.username)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(ValidationErrors::single(
            "username",
            "A user with that username already exists.",
        )));
    }

    let password_hash = password_service
        .hash(&registration.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut user = User::new(
        registration.profile.username.clone(),
        registration.profile.email.clone(),
        password_hash,
    );
    user.apply_profile(registration.profile);
    let user = state.users.create(user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    token_response(HttpResponse::Created(), token_service.get_ref().as_ref(), &user)
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::info!(username = %user.username, "Failed login attempt");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(user_id = %user.id, "User logged in");
    token_response(HttpResponse::Ok(), token_service.get_ref().as_ref(), &user)
}

/// POST /auth/logout/
///
/// Tokens are stateless; logging out only drops the cookie.
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(AUTH_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::NoContent().cookie(cookie).finish()
}
