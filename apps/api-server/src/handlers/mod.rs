//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod blog;
mod comments;
mod guard;
mod health;
mod paging;
mod posts;
mod present;
mod profile;
pub mod urls;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| AppError::NotFound("Page not found".to_string()).into()),
    )
    // Public routes
    .route("/health", web::get().to(health::health_check))
    // Auth routes
    .service(
        web::scope("/auth")
            .wrap(RateLimitMiddleware)
            .route("/registration/", web::post().to(auth::registration))
            .route("/login/", web::post().to(auth::login))
            .route("/logout/", web::post().to(auth::logout)),
    )
    // Staff routes
    .service(
        web::scope("/admin")
            .service(
                web::resource("/categories/")
                    .route(web::get().to(admin::list_categories))
                    .route(web::post().to(admin::create_category)),
            )
            .service(
                web::resource("/categories/{category_slug}/")
                    .route(web::patch().to(admin::update_category))
                    .route(web::delete().to(admin::delete_category)),
            )
            .service(
                web::resource("/locations/")
                    .route(web::get().to(admin::list_locations))
                    .route(web::post().to(admin::create_location)),
            )
            .service(
                web::resource("/locations/{location_id}/")
                    .route(web::patch().to(admin::update_location))
                    .route(web::delete().to(admin::delete_location)),
            ),
    )
    // Blog
    .route("/", web::get().to(blog::index))
    .route("/profile/{username}/", web::get().to(blog::profile))
    .route("/category/{category_slug}/", web::get().to(blog::category_posts))
    .service(
        web::resource("/edit_profile/")
            .route(web::get().to(profile::edit_form))
            .route(web::post().to(profile::edit)),
    )
    // Must precede the {post_id} routes
    .route("/posts/create/", web::post().to(posts::create))
    .route("/posts/{post_id}/", web::get().to(posts::detail))
    .service(
        web::resource("/posts/{post_id}/edit/")
            .route(web::get().to(posts::owner_view))
            .route(web::post().to(posts::edit)),
    )
    .service(
        web::resource("/posts/{post_id}/delete/")
            .route(web::get().to(posts::owner_view))
            .route(web::post().to(posts::delete)),
    )
    .route("/posts/{post_id}/comment/", web::post().to(comments::add))
    .service(
        web::resource("/posts/{post_id}/edit_comment/{comment_id}/")
            .route(web::get().to(comments::owner_view))
            .route(web::post().to(comments::edit)),
    )
    .service(
        web::resource("/posts/{post_id}/delete_comment/{comment_id}/")
            .route(web::get().to(comments::owner_view))
            .route(web::post().to(comments::delete)),
    );
}
