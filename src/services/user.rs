//! User service
//!
//! Registers users, issues their API tokens and resolves bearer tokens back
//! to users for the HTTP layer.

use crate::audit::EntityType;
use crate::error::{SpendError, SpendResult};
use crate::models::{User, UserId};
use crate::storage::Storage;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a user and issue their first API token
    pub fn create(&self, name: &str, email: &str) -> SpendResult<User> {
        let user = User::new(name, email);
        user.validate()
            .map_err(|e| SpendError::invalid_field(e.field(), e.to_string()))?;

        if self.storage.users.get_by_email(&user.email)?.is_some() {
            return Err(SpendError::Duplicate {
                entity_type: "User",
                identifier: user.email,
            });
        }

        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        self.storage
            .log_create(EntityType::User, user.id, Some(user.id), &redacted(&user));

        tracing::info!(user = %user.id, "registered user");
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> SpendResult<User> {
        self.storage
            .users
            .get(id)?
            .ok_or_else(|| SpendError::user_not_found(id.to_string()))
    }

    /// Look a user up by email
    pub fn find_by_email(&self, email: &str) -> SpendResult<User> {
        self.storage
            .users
            .get_by_email(email)?
            .ok_or_else(|| SpendError::user_not_found(email))
    }

    pub fn list(&self) -> SpendResult<Vec<User>> {
        self.storage.users.get_all()
    }

    /// Resolve a bearer token to its user
    pub fn authenticate(&self, token: &str) -> SpendResult<User> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SpendError::Unauthorized("Missing API token".into()));
        }

        self.storage
            .users
            .get_by_token(token)?
            .ok_or_else(|| SpendError::Unauthorized("Invalid API token".into()))
    }

    /// Issue a new token, invalidating the current one
    pub fn rotate_token(&self, id: UserId) -> SpendResult<User> {
        let mut user = self.get(id)?;
        let before = user.clone();
        user.rotate_token();

        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        self.storage.log_update(
            EntityType::User,
            user.id,
            Some(user.id),
            &redacted(&before),
            &redacted(&user),
        );

        Ok(user)
    }
}

/// Audit snapshot without the bearer token
fn redacted(user: &User) -> User {
    User {
        api_token: String::new(),
        ..user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_and_authenticate() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        let user = service.create("Ada", "ada@example.com").unwrap();
        let authed = service.authenticate(&user.api_token).unwrap();
        assert_eq!(authed.id, user.id);

        assert!(matches!(
            service.authenticate("sw_nope"),
            Err(SpendError::Unauthorized(_))
        ));
        assert!(matches!(
            service.authenticate("  "),
            Err(SpendError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_duplicate_email() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        service.create("Ada", "ada@example.com").unwrap();
        let err = service.create("Ada Two", "ADA@example.com").unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_invalid_email_is_field_error() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        match service.create("Ada", "not-an-email") {
            Err(SpendError::InvalidFields(fields)) => assert_eq!(fields[0].field, "email"),
            other => panic!("expected field error, got {:?}", other),
        }
    }

    #[test]
    fn test_rotate_token_invalidates_old() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        let user = service.create("Ada", "ada@example.com").unwrap();
        let rotated = service.rotate_token(user.id).unwrap();

        assert!(service.authenticate(&user.api_token).is_err());
        assert_eq!(service.authenticate(&rotated.api_token).unwrap().id, user.id);

        let log = std::fs::read_to_string(storage.audit().path()).unwrap();
        assert!(!log.contains(&user.api_token));
        assert!(!log.contains(&rotated.api_token));
    }
}
