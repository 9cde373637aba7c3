//! Paths the handlers redirect to.

use actix_web::{HttpResponse, http::header};
use uuid::Uuid;

pub const INDEX: &str = "/";
pub const LOGIN: &str = "/auth/login/";

/// 302 to `location`.
pub fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

pub fn login(next: &str) -> String {
    format!("{LOGIN}?next={}", urlencoding::encode(next))
}

pub fn post_detail(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

/// Usernames only hold characters that are legal in a path segment.
pub fn profile(username: &str) -> String {
    format!("/profile/{username}/")
}
