//! User model
//!
//! Users own custom categories, expenses and budgets. Each user carries an
//! opaque API token used as the bearer credential for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ids::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,

    pub name: String,

    /// Stored lowercased; unique across users
    pub email: String,

    pub api_token: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a freshly issued token
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into().trim().to_string(),
            email: normalize_email(&email.into()),
            api_token: issue_token(),
            created_at: Utc::now(),
        }
    }

    /// Replace the API token, invalidating the old one
    pub fn rotate_token(&mut self) {
        self.api_token = issue_token();
    }

    /// Validate the user
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if self.name.chars().count() > 100 {
            return Err(UserValidationError::NameTooLong(self.name.chars().count()));
        }
        if !looks_like_email(&self.email) {
            return Err(UserValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_token() -> String {
    format!("sw_{}", Uuid::new_v4().simple())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Validation errors for users
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidEmail(String),
}

impl UserValidationError {
    /// The request field this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong(_) => "name",
            Self::InvalidEmail(_) => "email",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name cannot be empty"),
            Self::NameTooLong(len) => write!(f, "Name too long ({} chars, max 100)", len),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: {}", email),
        }
    }
}

impl std::error::Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_email() {
        let user = User::new("  Ada ", " Ada@Example.COM ");
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.api_token.starts_with("sw_"));
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_rotate_token() {
        let mut user = User::new("Ada", "ada@example.com");
        let old = user.api_token.clone();
        user.rotate_token();
        assert_ne!(user.api_token, old);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            User::new("", "ada@example.com").validate(),
            Err(UserValidationError::EmptyName)
        );
        let err = User::new("Ada", "not-an-email").validate().unwrap_err();
        assert_eq!(err.field(), "email");
        assert!(User::new("Ada", "ada@localhost").validate().is_err());
    }
}
