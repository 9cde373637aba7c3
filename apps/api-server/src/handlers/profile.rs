//! The logged-in user's own profile form.

use actix_web::{HttpResponse, web};

use blogicum_core::domain::{ProfileChanges, User};
use blogicum_core::ports::BaseRepository;
use blogicum_core::validation::ValidationErrors;

use crate::handlers::{present, urls};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const EDIT_PROFILE_PATH: &str = "/edit_profile/";

/// The account behind the token; a token for a deleted account is a login prompt.
async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::LoginRequired {
            next: EDIT_PROFILE_PATH.to_string(),
        })
}

/// GET /edit_profile/
pub async fn edit_form(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(present::account(user)))
}

/// POST /edit_profile/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ProfileChanges>,
) -> AppResult<HttpResponse> {
    let mut user = current_user(&state, &identity).await?;
    let changes = body.into_inner().cleaned()?;

    if changes.username != user.username {
        let taken = state
            .users
            .find_by_username(&changes.username)
            .await?
            .is_some_and(|other| other.id != user.id);
        if taken {
            return Err(AppError::Validation(ValidationErrors::single(
                "username",
                "A user with that username already exists.",
            )));
        }
    }

    user.apply_profile(changes);
    let user = state.users.update(user).await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(urls::redirect(urls::profile(&user.username)))
}
