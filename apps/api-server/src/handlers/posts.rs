//! Post pages: create, read, edit, delete.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_core::domain::{Post, PostDraft, PostView};
use blogicum_core::policy::can_view_post;
use blogicum_core::ports::BaseRepository;
use blogicum_core::validation::ValidationErrors;
use blogicum_shared::dto::PostDetailResponse;

use crate::handlers::{guard, present, urls};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Referenced category and location must exist.
async fn check_references(state: &AppState, draft: &PostDraft) -> AppResult<()> {
    let mut errors = ValidationErrors::new();

    if let Some(category_id) = draft.category_id {
        if state.categories.find_by_id(category_id).await?.is_none() {
            errors.add("category", INVALID_CHOICE);
        }
    }
    if let Some(location_id) = draft.location_id {
        if state.locations.find_by_id(location_id).await?.is_none() {
            errors.add("location", INVALID_CHOICE);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

async fn load_view(state: &AppState, post_id: Uuid) -> AppResult<PostView> {
    state
        .posts
        .find_view(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

/// POST /posts/create/
///
/// The author is always the requester.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostDraft>,
) -> AppResult<HttpResponse> {
    let author = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::LoginRequired {
            next: "/posts/create/".to_string(),
        })?;

    let draft = body.into_inner().cleaned()?;
    check_references(&state, &draft).await?;

    let post = state.posts.create(Post::new(author.id, draft)).await?;
    tracing::info!(post_id = %post.id, author_id = %author.id, "Post created");

    Ok(urls::redirect(urls::profile(&author.username)))
}

/// GET /posts/{post_id}/
///
/// Hidden posts are a 404 for everyone but their author.
pub async fn detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let view = load_view(&state, path.into_inner()).await?;

    if !can_view_post(&view.post, view.category.as_ref(), viewer.user_id(), Utc::now()) {
        tracing::debug!(post_id = %view.post.id, "Hidden post requested");
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let comments = state.comments.list_for_post(view.post.id).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: present::post(view),
        comments: comments.into_iter().map(present::comment).collect(),
    }))
}

/// GET /posts/{post_id}/edit/ and GET /posts/{post_id}/delete/
pub async fn owner_view(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = guard::owned_post(&state, path.into_inner(), &viewer, req.path()).await?;
    let view = load_view(&state, post.id).await?;

    Ok(HttpResponse::Ok().json(present::post(view)))
}

/// POST /posts/{post_id}/edit/
pub async fn edit(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<PostDraft>,
) -> AppResult<HttpResponse> {
    let mut post = guard::owned_post(&state, path.into_inner(), &viewer, req.path()).await?;

    let draft = body.into_inner().cleaned()?;
    check_references(&state, &draft).await?;

    post.apply(draft);
    let post = state.posts.update(post).await?;
    tracing::info!(post_id = %post.id, "Post updated");

    Ok(urls::redirect(urls::post_detail(post.id)))
}

/// POST /posts/{post_id}/delete/
///
/// Comments go with the post.
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = guard::owned_post(&state, path.into_inner(), &viewer, req.path()).await?;

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, author_id = %post.author_id, "Post deleted");

    Ok(urls::redirect(urls::INDEX))
}
