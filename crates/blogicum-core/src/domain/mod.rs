//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod page;
mod post;
mod user;

pub use category::{Category, CategoryChanges, CategoryDraft};
pub use comment::{Comment, CommentDraft, CommentView};
pub use location::{Location, LocationChanges, LocationDraft};
pub use page::{Page, PageRequest};
pub use post::{FeedQuery, Post, PostDraft, PostView};
pub use user::{Author, ProfileChanges, Registration, User};

/// Publishable entities start out published unless the form says otherwise.
pub(crate) fn default_true() -> bool {
    true
}
