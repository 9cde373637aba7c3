use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Author, Category, Location};
use crate::error::DomainError;
use crate::policy::{self, FeedScope};
use crate::validation::{self, ValidationErrors};

const TITLE_MAX_CHARS: usize = 256;
const IMAGE_MAX_CHARS: usize = 100;

/// Post entity - a blog publication.
///
/// A post with `pub_date` in the future is a scheduled publication: it stays out
/// of public feeds until that moment passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. The author always comes from the requester's identity.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id: draft.category_id,
            location_id: draft.location_id,
            title: draft.title,
            text: draft.text,
            pub_date: draft.pub_date,
            image: draft.image,
            is_published: draft.is_published,
            created_at: Utc::now(),
        }
    }

    /// Replace every editable field; identity, author and creation time stay.
    pub fn apply(&mut self, draft: PostDraft) {
        self.category_id = draft.category_id;
        self.location_id = draft.location_id;
        self.title = draft.title;
        self.text = draft.text;
        self.pub_date = draft.pub_date;
        self.image = draft.image;
        self.is_published = draft.is_published;
    }
}

/// Submitted post form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub location_id: Option<Uuid>,
    #[serde(default = "crate::domain::default_true")]
    pub is_published: bool,
}

impl PostDraft {
    /// Trim and check the text fields. Whether `category_id` and `location_id`
    /// point at existing rows needs storage and is checked by the caller.
    pub fn cleaned(self) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let title = validation::required_text(&mut errors, "title", &self.title, Some(TITLE_MAX_CHARS));
        let text = validation::required_text(&mut errors, "text", &self.text, None);
        let image = self
            .image
            .map(|i| validation::optional_text(&mut errors, "image", &i, Some(IMAGE_MAX_CHARS)))
            .filter(|i| !i.is_empty());

        errors.finish(Self {
            title,
            text,
            image,
            ..self
        })
    }
}

/// A post joined with its author, category and location, plus its comment count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    pub author: Author,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: u64,
}

/// Which posts a feed shows, evaluated at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub scope: FeedScope,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub now: DateTime<Utc>,
}

impl FeedQuery {
    /// The public home feed.
    pub fn published(now: DateTime<Utc>) -> Self {
        Self {
            scope: FeedScope::Published,
            author_id: None,
            category_id: None,
            now,
        }
    }

    /// An author's profile feed as seen by `viewer`.
    pub fn by_author(author_id: Uuid, viewer: Option<Uuid>, now: DateTime<Utc>) -> Self {
        Self {
            scope: FeedScope::for_viewer(viewer, author_id),
            author_id: Some(author_id),
            category_id: None,
            now,
        }
    }

    /// The public feed of one category.
    pub fn in_category(category_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::published(now)
        }
    }

    /// Whether `post`, filed under `category`, belongs in this feed.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        if self.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        if self.category_id.is_some() && self.category_id != post.category_id {
            return false;
        }
        match self.scope {
            FeedScope::All => true,
            FeedScope::Published => policy::is_publicly_visible(post, category, self.now),
        }
    }
}
