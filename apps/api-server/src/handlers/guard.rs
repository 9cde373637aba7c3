//! Ownership checks for edit and delete routes.
//!
//! The target is loaded first, so a missing target is a 404 for everyone.
//! Anonymous requests are then sent to the login page, and other users are
//! sent back to the post they tried to change.

use blogicum_core::domain::{Comment, Post};
use blogicum_core::policy::{Access, mutation_access};
use blogicum_core::ports::BaseRepository;
use uuid::Uuid;

use crate::handlers::urls;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn enforce(access: Access, path: &str, post_id: Uuid, viewer: &OptionalIdentity) -> AppResult<()> {
    match access {
        Access::Granted => Ok(()),
        Access::LoginRequired => Err(AppError::LoginRequired {
            next: path.to_string(),
        }),
        Access::NotOwner => {
            tracing::info!(
                post_id = %post_id,
                user_id = ?viewer.user_id(),
                "Mutation by non-owner redirected"
            );
            Err(AppError::NotOwner {
                redirect_to: urls::post_detail(post_id),
            })
        }
    }
}

/// Load a post that `viewer` is about to change.
pub async fn owned_post(
    state: &AppState,
    post_id: Uuid,
    viewer: &OptionalIdentity,
    path: &str,
) -> AppResult<Post> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    enforce(mutation_access(viewer.user_id(), post.author_id), path, post.id, viewer)?;
    Ok(post)
}

/// Load a comment of `post_id` that `viewer` is about to change.
///
/// A comment reached through another post's URL does not exist.
pub async fn owned_comment(
    state: &AppState,
    post_id: Uuid,
    comment_id: Uuid,
    viewer: &OptionalIdentity,
    path: &str,
) -> AppResult<Comment> {
    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    enforce(mutation_access(viewer.user_id(), comment.author_id), path, post_id, viewer)?;
    Ok(comment)
}
