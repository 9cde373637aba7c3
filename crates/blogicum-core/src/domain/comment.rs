use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Author;
use crate::error::DomainError;
use crate::validation::{self, ValidationErrors};

/// Comment entity - a reader's reply under a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, draft: CommentDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text: draft.text,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDraft {
    pub text: String,
}

impl CommentDraft {
    pub fn cleaned(self) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let text = validation::required_text(&mut errors, "text", &self.text, None);
        errors.finish(Self { text })
    }
}

/// A comment joined with its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: Author,
}
