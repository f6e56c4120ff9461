//! Storage layer for Spendwise
//!
//! Four JSON document collections (users, categories, expenses, budgets)
//! with atomic writes and automatic directory creation, plus the audit log.

pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod init;
pub mod json_file;
pub mod users;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use expenses::{ExpenseQuery, ExpenseRepository};
pub use init::initialize_storage;
pub use json_file::JsonFile;
pub use users::UserRepository;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::SpendwisePaths;
use crate::error::SpendError;
use crate::models::UserId;

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, SpendError> {
    lock.read()
        .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, SpendError> {
    lock.write()
        .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: SpendwisePaths,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub expenses: ExpenseRepository,
    pub budgets: BudgetRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: SpendwisePaths) -> Result<Self, SpendError> {
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Create storage, seed it on first run and load every collection
    pub fn open(paths: SpendwisePaths) -> Result<Self, SpendError> {
        initialize_storage(&paths)?;
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &SpendwisePaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), SpendError> {
        self.users.load()?;
        self.categories.load()?;
        self.expenses.load()?;
        self.budgets.load()?;
        Ok(())
    }

    /// Record a create in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl std::fmt::Display,
        actor: Option<UserId>,
        entity: &T,
    ) {
        self.record(AuditEntry::create(entity_type, entity_id, actor, entity));
    }

    /// Record an update in the audit log
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl std::fmt::Display,
        actor: Option<UserId>,
        before: &T,
        after: &T,
    ) {
        self.record(AuditEntry::update(entity_type, entity_id, actor, before, after));
    }

    /// Record a delete in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl std::fmt::Display,
        actor: Option<UserId>,
        entity: &T,
    ) {
        self.record(AuditEntry::delete(entity_type, entity_id, actor, entity));
    }

    // The mutation already persisted; a lost audit line is logged, not surfaced
    fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.audit.log(&entry) {
            tracing::warn!(
                error = %e,
                entity = %entry.entity_type,
                id = %entry.entity_id,
                "failed to write audit entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GLOBAL_DEFAULTS;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(storage.categories.count().unwrap(), 0);
    }

    #[test]
    fn test_open_seeds_globals() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();

        assert_eq!(storage.categories.count().unwrap(), GLOBAL_DEFAULTS.len());
    }

    #[test]
    fn test_audit_helpers_append() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        storage.log_create(EntityType::User, "usr-1", None, &serde_json::json!({}));
        storage.log_delete(EntityType::User, "usr-1", None, &serde_json::json!({}));

        assert_eq!(storage.audit().read_all().unwrap().len(), 2);
    }
}
