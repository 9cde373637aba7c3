use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::validation::{self, ValidationErrors};

const NAME_MAX_CHARS: usize = 256;

/// Location entity - where a post was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(draft: LocationDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            is_published: draft.is_published,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, changes: LocationChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(is_published) = changes.is_published {
            self.is_published = is_published;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDraft {
    pub name: String,
    #[serde(default = "crate::domain::default_true")]
    pub is_published: bool,
}

impl LocationDraft {
    pub fn cleaned(self) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let name = validation::required_text(&mut errors, "name", &self.name, Some(NAME_MAX_CHARS));
        errors.finish(Self {
            name,
            is_published: self.is_published,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationChanges {
    pub name: Option<String>,
    pub is_published: Option<bool>,
}

impl LocationChanges {
    pub fn cleaned(self) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let name = self
            .name
            .map(|n| validation::required_text(&mut errors, "name", &n, Some(NAME_MAX_CHARS)));
        errors.finish(Self {
            name,
            is_published: self.is_published,
        })
    }
}
