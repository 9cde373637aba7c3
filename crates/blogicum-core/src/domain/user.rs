use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::validation::{self, ValidationErrors};

const NAME_MAX_CHARS: usize = 150;

/// User entity - the identity that owns posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
            is_staff: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Roles carried in this user's access tokens.
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec!["user".to_string()];
        if self.is_staff {
            roles.push("staff".to_string());
        }
        roles
    }

    pub fn apply_profile(&mut self, changes: ProfileChanges) {
        self.first_name = changes.first_name;
        self.last_name = changes.last_name;
        self.username = changes.username;
        self.email = changes.email;
        self.updated_at = Utc::now();
    }
}

/// The public face of a user, shown next to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// The editable part of a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl ProfileChanges {
    /// Trim and check every field. Username uniqueness needs storage and is
    /// checked by the caller.
    pub fn cleaned(self) -> Result<Self, DomainError> {
        let mut errors = ValidationErrors::new();
        let first_name =
            validation::optional_text(&mut errors, "first_name", &self.first_name, Some(NAME_MAX_CHARS));
        let last_name =
            validation::optional_text(&mut errors, "last_name", &self.last_name, Some(NAME_MAX_CHARS));
        let username = validation::username(&mut errors, &self.username);
        let email = validation::email(&mut errors, &self.email);

        errors.finish(Self {
            first_name,
            last_name,
            username,
            email,
        })
    }
}

/// A sign-up form: the profile fields plus the initial password.
#[derive(Debug, Clone)]
pub struct Registration {
    pub profile: ProfileChanges,
    pub password: String,
}

impl Registration {
    /// Reports profile and password problems together.
    pub fn cleaned(self) -> Result<Self, DomainError> {
        let (profile, mut errors) = match self.profile.cleaned() {
            Ok(profile) => (Some(profile), ValidationErrors::new()),
            Err(DomainError::Validation(errors)) => (None, errors),
        };
        validation::password(&mut errors, &self.password);

        match profile {
            Some(profile) if errors.is_empty() => Ok(Self {
                profile,
                password: self.password,
            }),
            _ => Err(DomainError::Validation(errors)),
        }
    }
}
