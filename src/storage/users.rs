//! User repository for JSON storage
//!
//! Manages loading and saving users to users.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendError;
use crate::models::user::normalize_email;
use crate::models::{User, UserId};

use super::json_file::JsonFile;
use super::{read_lock, write_lock};

/// Serializable user collection
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<User>,
}

/// Repository for user persistence
pub struct UserRepository {
    file: JsonFile<UserData>,
    data: RwLock<HashMap<UserId, User>>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load users from disk
    pub fn load(&self) -> Result<(), SpendError> {
        let file_data = self.file.load()?;

        let mut data = write_lock(&self.data)?;
        data.clear();
        for user in file_data.users {
            data.insert(user.id, user);
        }

        Ok(())
    }

    /// Save users to disk
    pub fn save(&self) -> Result<(), SpendError> {
        // Exclusive so concurrent saves cannot interleave snapshots
        let data = write_lock(&self.data)?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        self.file.store(&UserData { users })
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> Result<Option<User>, SpendError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// Get a user by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>, SpendError> {
        let data = read_lock(&self.data)?;
        let email = normalize_email(email);
        Ok(data.values().find(|u| u.email == email).cloned())
    }

    /// Get the user holding an API token
    pub fn get_by_token(&self, token: &str) -> Result<Option<User>, SpendError> {
        let data = read_lock(&self.data)?;
        Ok(data.values().find(|u| u.api_token == token).cloned())
    }

    /// Get all users, oldest first
    pub fn get_all(&self) -> Result<Vec<User>, SpendError> {
        let data = read_lock(&self.data)?;
        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    /// Insert or update a user, keeping emails unique
    pub fn upsert(&self, user: User) -> Result<(), SpendError> {
        let mut data = write_lock(&self.data)?;

        if data
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(SpendError::Duplicate {
                entity_type: "User",
                identifier: user.email,
            });
        }

        data.insert(user.id, user);
        Ok(())
    }

    /// Count users
    pub fn count(&self) -> Result<usize, SpendError> {
        let data = read_lock(&self.data)?;
        Ok(data.len())
    }
}
