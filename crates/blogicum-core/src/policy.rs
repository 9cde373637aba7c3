//! Who may see and who may change what.
//!
//! A post is public when it is published, filed under a published category, and
//! its publication date has passed. Authors always see their own posts. Nobody
//! but the author may change a post or a comment.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post};

/// Which read path a feed uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Only publicly visible posts.
    Published,
    /// Every post, whatever its publication state. Reserved for the author.
    All,
}

impl FeedScope {
    /// The owner feed when the viewer is the author, the public feed otherwise.
    pub fn for_viewer(viewer: Option<Uuid>, author_id: Uuid) -> Self {
        if viewer == Some(author_id) {
            Self::All
        } else {
            Self::Published
        }
    }
}

/// A post without a category is never public.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && category.is_some_and(|c| c.is_published) && post.pub_date <= now
}

/// Whether `viewer` may open the detail page of `post`.
pub fn can_view_post(
    post: &Post,
    category: Option<&Category>,
    viewer: Option<Uuid>,
    now: DateTime<Utc>,
) -> bool {
    viewer == Some(post.author_id) || is_publicly_visible(post, category, now)
}

/// Outcome of an ownership check on a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Nobody is logged in; send them to the login page.
    LoginRequired,
    /// Logged in as someone else; send them back to the detail page.
    NotOwner,
}

pub fn mutation_access(viewer: Option<Uuid>, author_id: Uuid) -> Access {
    match viewer {
        None => Access::LoginRequired,
        Some(id) if id == author_id => Access::Granted,
        Some(_) => Access::NotOwner,
    }
}
