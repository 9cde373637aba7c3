//! Comment routes nested under a post.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use blogicum_core::domain::{Author, Comment, CommentDraft, CommentView};
use blogicum_core::policy::can_view_post;
use blogicum_core::ports::BaseRepository;

use crate::handlers::{guard, present, urls};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentPath {
    post_id: Uuid,
    comment_id: Uuid,
}

/// POST /posts/{post_id}/comment/
///
/// Only posts the commenter can see accept comments.
pub async fn add(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentDraft>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let author = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::LoginRequired {
            next: req.path().to_string(),
        })?;

    let view = state
        .posts
        .find_view(post_id)
        .await?
        .filter(|view| can_view_post(&view.post, view.category.as_ref(), Some(author.id), Utc::now()))
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let draft = body.into_inner().cleaned()?;
    let comment = state
        .comments
        .create(Comment::new(view.post.id, author.id, draft))
        .await?;
    tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment added");

    Ok(urls::redirect(urls::post_detail(post_id)))
}

/// GET /posts/{post_id}/edit_comment/{comment_id}/ and the delete twin
pub async fn owner_view(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<CommentPath>,
) -> AppResult<HttpResponse> {
    let CommentPath { post_id, comment_id } = path.into_inner();
    let comment = guard::owned_comment(&state, post_id, comment_id, &viewer, req.path()).await?;

    let author = state
        .users
        .find_by_id(comment.author_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    Ok(HttpResponse::Ok().json(present::comment(CommentView {
        comment,
        author: Author::from(&author),
    })))
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<CommentPath>,
    body: web::Json<CommentDraft>,
) -> AppResult<HttpResponse> {
    let CommentPath { post_id, comment_id } = path.into_inner();
    let mut comment =
        guard::owned_comment(&state, post_id, comment_id, &viewer, req.path()).await?;

    comment.text = body.into_inner().cleaned()?.text;
    state.comments.update(comment).await?;
    tracing::info!(comment_id = %comment_id, post_id = %post_id, "Comment updated");

    Ok(urls::redirect(urls::post_detail(post_id)))
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<CommentPath>,
) -> AppResult<HttpResponse> {
    let CommentPath { post_id, comment_id } = path.into_inner();
    let comment = guard::owned_comment(&state, post_id, comment_id, &viewer, req.path()).await?;

    state.comments.delete(comment.id).await?;
    tracing::info!(comment_id = %comment_id, post_id = %post_id, "Comment deleted");

    Ok(urls::redirect(urls::post_detail(post_id)))
}
