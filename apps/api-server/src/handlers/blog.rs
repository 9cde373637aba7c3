//! Read-only feeds: the index, author profiles and categories.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::domain::FeedQuery;
use blogicum_shared::dto::{CategoryPageResponse, ProfilePageResponse};

use crate::handlers::paging::{PageQuery, load_feed};
use crate::handlers::present;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let feed = FeedQuery::published(Utc::now());
    let posts = load_feed(state.posts.as_ref(), &feed, &query).await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /profile/{username}/
///
/// The owner sees every one of their posts, everyone else the public ones.
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;

    let feed = FeedQuery::by_author(user.id, viewer.user_id(), Utc::now());
    let posts = load_feed(state.posts.as_ref(), &feed, &query).await?;

    Ok(HttpResponse::Ok().json(ProfilePageResponse {
        profile: present::profile(&user),
        posts,
    }))
}

/// GET /category/{category_slug}/
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(|category| category.is_published)
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", slug)))?;

    let feed = FeedQuery::in_category(category.id, Utc::now());
    let posts = load_feed(state.posts.as_ref(), &feed, &query).await?;

    Ok(HttpResponse::Ok().json(CategoryPageResponse {
        category: present::category(category),
        posts,
    }))
}
