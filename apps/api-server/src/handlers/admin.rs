//! Staff-only management of categories and locations.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blogicum_core::domain::{
    Category, CategoryChanges, CategoryDraft, Location, LocationChanges, LocationDraft,
};
use blogicum_core::ports::BaseRepository;
use blogicum_core::validation::ValidationErrors;

use crate::handlers::present;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn category_by_slug(state: &AppState, slug: &str) -> AppResult<Category> {
    state
        .categories
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", slug)))
}

async fn location_by_id(state: &AppState, id: Uuid) -> AppResult<Location> {
    state
        .locations
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".to_string()))
}

/// GET /admin/categories/
pub async fn list_categories(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let categories = state.categories.list().await?;

    Ok(HttpResponse::Ok().json(
        categories
            .into_iter()
            .map(present::category)
            .collect::<Vec<_>>(),
    ))
}

/// POST /admin/categories/
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CategoryDraft>,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let draft = body.into_inner().cleaned()?;

    if state.categories.find_by_slug(&draft.slug).await?.is_some() {
        return Err(AppError::Validation(ValidationErrors::single(
            "slug",
            "Category with this slug already exists.",
        )));
    }

    let category = state.categories.create(Category::new(draft)).await?;
    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");

    Ok(HttpResponse::Created().json(present::category(category)))
}

/// PATCH /admin/categories/{slug}/
pub async fn update_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<CategoryChanges>,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let mut category = category_by_slug(&state, &path).await?;

    category.apply(body.into_inner().cleaned()?);
    let category = state.categories.update(category).await?;
    tracing::info!(category_id = %category.id, "Category updated");

    Ok(HttpResponse::Ok().json(present::category(category)))
}

/// DELETE /admin/categories/{slug}/
///
/// Posts of the category stay, with no category.
pub async fn delete_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let category = category_by_slug(&state, &path).await?;

    state.categories.delete(category.id).await?;
    tracing::info!(category_id = %category.id, "Category deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// GET /admin/locations/
pub async fn list_locations(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let locations = state.locations.list().await?;

    Ok(HttpResponse::Ok().json(
        locations
            .into_iter()
            .map(present::location)
            .collect::<Vec<_>>(),
    ))
}

/// POST /admin/locations/
pub async fn create_location(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<LocationDraft>,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let draft = body.into_inner().cleaned()?;

    let location = state.locations.create(Location::new(draft)).await?;
    tracing::info!(location_id = %location.id, "Location created");

    Ok(HttpResponse::Created().json(present::location(location)))
}

/// PATCH /admin/locations/{location_id}/
pub async fn update_location(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<LocationChanges>,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let mut location = location_by_id(&state, path.into_inner()).await?;

    location.apply(body.into_inner().cleaned()?);
    let location = state.locations.update(location).await?;
    tracing::info!(location_id = %location.id, "Location updated");

    Ok(HttpResponse::Ok().json(present::location(location)))
}

/// DELETE /admin/locations/{location_id}/
pub async fn delete_location(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let location = location_by_id(&state, path.into_inner()).await?;

    state.locations.delete(location.id).await?;
    tracing::info!(location_id = %location.id, "Location deleted");

    Ok(HttpResponse::NoContent().finish())
}
