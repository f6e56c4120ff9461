//! Category model
//!
//! A category is either global (no owner, shared by every user, read-only)
//! or custom (owned by one user). Names are unique per visible scope:
//! a user's custom names may not collide with globals or with each other,
//! ignoring case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, UserId};

/// Color used when none is supplied
pub const DEFAULT_COLOR: &str = "#6B7280";

/// Shared categories seeded on first initialization
pub const GLOBAL_DEFAULTS: &[(&str, &str)] = &[
    ("Food", "#F59E0B"),
    ("Transport", "#3B82F6"),
    ("Housing", "#8B5CF6"),
    ("Utilities", "#10B981"),
    ("Entertainment", "#EC4899"),
    ("Health", "#EF4444"),
    ("Shopping", "#F97316"),
    ("Education", "#14B8A6"),
    ("Other", DEFAULT_COLOR),
];

/// Whether a category is shared or user-owned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKind {
    Global,
    Custom,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "Global"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    /// Display color as `#RRGGBB`
    pub color: String,

    /// Owner; `None` for global categories
    pub user_id: Option<UserId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a global category
    pub fn global(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self::build(name.into(), color.into(), None)
    }

    /// Create a custom category owned by `user_id`
    pub fn custom(name: impl Into<String>, color: impl Into<String>, user_id: UserId) -> Self {
        Self::build(name.into(), color.into(), Some(user_id))
    }

    fn build(name: String, color: String, user_id: Option<UserId>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.trim().to_string(),
            color: color.trim().to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> CategoryKind {
        if self.user_id.is_some() {
            CategoryKind::Custom
        } else {
            CategoryKind::Global
        }
    }

    pub fn is_global(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }

    /// Globals are visible to everyone, custom categories to their owner
    pub fn is_visible_to(&self, user_id: UserId) -> bool {
        self.is_global() || self.is_owned_by(user_id)
    }

    /// Case-insensitive name comparison
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        let len = self.name.chars().count();
        if len > 50 {
            return Err(CategoryValidationError::NameTooLong(len));
        }

        if !is_hex_color(&self.color) {
            return Err(CategoryValidationError::InvalidColor(self.color.clone()));
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidColor(String),
}

impl CategoryValidationError {
    /// The request field this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong(_) => "name",
            Self::InvalidColor(_) => "color",
        }
    }
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
            Self::InvalidColor(color) => {
                write!(f, "Invalid color '{}': use #RRGGBB", color)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}
