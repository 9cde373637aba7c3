use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::validation::{self, ValidationErrors};

const TITLE_MAX_CHARS: usize = 256;
const SLUG_MAX_CHARS: usize = 64;

/// Category entity - groups posts under a URL slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Immutable lookup key used in category URLs.
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(draft: CategoryDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            slug: draft.slug,
            is_published: draft.is_published,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, changes: CategoryChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(is_published) = changes.is_published {
            self.is_published = is_published;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub title: String,
    pub description: String,
    pub slug: String,
    #[serde(default = "crate::domain::default_true")]
    pub is_published: bool,
}

impl CategoryDraft {
    pub fn cleaned(self) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let title = validation::required_text(&mut errors, "title", &self.title, Some(TITLE_MAX_CHARS));
        let description =
            validation::required_text(&mut errors, "description", &self.description, None);
        let slug = validation::required_text(&mut errors, "slug", &self.slug, Some(SLUG_MAX_CHARS));
        if !slug.is_empty() && !validation::is_valid_slug(&slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        }

        errors.finish(Self {
            title,
            description,
            slug,
            is_published: self.is_published,
        })
    }
}

/// Partial update of a category; the slug cannot change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
}

impl CategoryChanges {
    pub fn cleaned(self) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let title = self
            .title
            .map(|t| validation::required_text(&mut errors, "title", &t, Some(TITLE_MAX_CHARS)));
        let description = self
            .description
            .map(|d| validation::required_text(&mut errors, "description", &d, None));

        errors.finish(Self {
            title,
            description,
            is_published: self.is_published,
        })
    }
}
