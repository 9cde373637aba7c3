//! Field-level validation shared by every submitted form.
//!
//! Text fields are trimmed before they are checked, and the trimmed value is what
//! gets stored.

use std::fmt;

use serde::Serialize;

use crate::error::DomainError;

pub const REQUIRED: &str = "This field is required.";

/// One message attached to one submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every problem found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a submission with exactly one bad field.
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Whether any message targets `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when nothing was recorded, the collected errors otherwise.
    pub fn finish<T>(self, value: T) -> Result<T, DomainError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Trims `value` and checks it is present and at most `max_chars` long.
pub(crate) fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max_chars: Option<usize>,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        check_length(errors, field, trimmed, max_chars);
    }
    trimmed.to_string()
}

/// Trims `value`; blank is allowed but a long value is not.
pub(crate) fn optional_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max_chars: Option<usize>,
) -> String {
    let trimmed = value.trim();
    check_length(errors, field, trimmed, max_chars);
    trimmed.to_string()
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max_chars: Option<usize>,
) {
    if let Some(max) = max_chars {
        let len = value.chars().count();
        if len > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }
}

const USERNAME_MAX_CHARS: usize = 150;

/// Cleans a username: required, bounded, restricted charset.
pub fn username(errors: &mut ValidationErrors, value: &str) -> String {
    let username = required_text(errors, "username", value, Some(USERNAME_MAX_CHARS));
    if !username.is_empty() && !is_valid_username(&username) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    username
}

/// Cleans an email address; blank is allowed.
pub fn email(errors: &mut ValidationErrors, value: &str) -> String {
    let email = value.trim().to_string();
    if !email.is_empty() && !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }
    email
}

pub const PASSWORD_MIN_CHARS: usize = 8;

/// Checks a new password; the value itself is never trimmed.
pub fn password(errors: &mut ValidationErrors, value: &str) {
    if value.is_empty() {
        errors.add("password", REQUIRED);
    } else if value.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            "password",
            format!("This password is too short. It must contain at least {PASSWORD_MIN_CHARS} characters."),
        );
    }
}

/// Letters, digits, hyphens and underscores only.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Letters, digits and `@ . + - _`.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// A deliberately loose shape check: `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !domain.ends_with('.')
}
