//! Category service
//!
//! Lists the categories a user can see and manages the user's custom
//! categories. Global categories are read-only; renames and deletes cascade
//! onto the owner's expenses and budgets.

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{SpendError, SpendResult};
use crate::models::{Category, CategoryId, UserId, DEFAULT_COLOR};
use crate::storage::Storage;

/// Fields accepted when creating a custom category
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
}

/// Partial update of a custom category
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// What a category delete touched
#[derive(Debug, Clone)]
pub struct CategoryDeletion {
    pub category: Category,
    pub expenses_reassigned: usize,
    pub budgets_removed: usize,
}

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Global categories plus the user's own
    pub fn list(&self, user_id: UserId) -> SpendResult<Vec<Category>> {
        self.storage.categories.get_visible_to(user_id)
    }

    /// Get a category the user can see
    pub fn get_visible(&self, user_id: UserId, id: CategoryId) -> SpendResult<Category> {
        self.storage
            .categories
            .get(id)?
            .filter(|c| c.is_visible_to(user_id))
            .ok_or_else(|| SpendError::category_not_found(id.to_string()))
    }

    /// Find a visible category by ID string or name
    pub fn find(&self, user_id: UserId, identifier: &str) -> SpendResult<Category> {
        if let Some(category) = self.storage.categories.find_by_name(user_id, identifier)? {
            return Ok(category);
        }

        match identifier.parse::<CategoryId>() {
            Ok(id) => self.get_visible(user_id, id),
            Err(_) => Err(SpendError::category_not_found(identifier)),
        }
    }

    /// Resolve an optional category reference given by id or by name
    ///
    /// An id wins over a name. Unknown or foreign categories are reported
    /// against the field that named them.
    pub fn resolve(
        &self,
        user_id: UserId,
        id: Option<CategoryId>,
        name: Option<&str>,
    ) -> SpendResult<Option<Category>> {
        if let Some(id) = id {
            return self
                .get_visible(user_id, id)
                .map(Some)
                .map_err(|e| {
                    if e.is_not_found() {
                        SpendError::invalid_field("categoryId", "Category not found")
                    } else {
                        e
                    }
                });
        }

        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self
                .storage
                .categories
                .find_by_name(user_id, name)?
                .map(Some)
                .ok_or_else(|| {
                    SpendError::invalid_field("category", format!("Unknown category '{}'", name))
                }),
            None => Ok(None),
        }
    }

    /// Create a custom category for `user_id`
    pub fn create(&self, user_id: UserId, input: NewCategory) -> SpendResult<Category> {
        let color = input.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());
        let category = Category::custom(input.name, color, user_id);
        category
            .validate()
            .map_err(|e| SpendError::invalid_field(e.field(), e.to_string()))?;

        self.ensure_name_free(&category)?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage
            .log_create(EntityType::Category, category.id, Some(user_id), &category);

        Ok(category)
    }

    /// Update one of the user's categories
    pub fn update(
        &self,
        user_id: UserId,
        id: CategoryId,
        changes: CategoryChanges,
    ) -> SpendResult<Category> {
        let mut category = self.owned(user_id, id)?;
        let before = category.clone();

        if let Some(name) = changes.name {
            category.name = name.trim().to_string();
        }
        if let Some(color) = changes.color {
            category.color = color.trim().to_string();
        }
        category
            .validate()
            .map_err(|e| SpendError::invalid_field(e.field(), e.to_string()))?;

        let renamed = category.name != before.name;
        if renamed {
            self.ensure_name_free(&category)?;
        }

        category.updated_at = Utc::now();
        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        if renamed {
            let expenses = self.storage.expenses.rename_category(&category)?;
            if expenses > 0 {
                self.storage.expenses.save()?;
            }
            let budgets = self.storage.budgets.rename_category(&category)?;
            if budgets > 0 {
                self.storage.budgets.save()?;
            }
            tracing::debug!(category = %category.id, expenses, budgets, "propagated rename");
        }

        self.storage
            .log_update(EntityType::Category, category.id, Some(user_id), &before, &category);

        Ok(category)
    }

    /// Delete one of the user's categories
    ///
    /// Its expenses become uncategorized and its budgets are removed.
    pub fn delete(&self, user_id: UserId, id: CategoryId) -> SpendResult<CategoryDeletion> {
        let category = self.owned(user_id, id)?;

        self.storage.categories.delete(id)?;
        self.storage.categories.save()?;

        let expenses_reassigned = self.storage.expenses.clear_category(id)?;
        if expenses_reassigned > 0 {
            self.storage.expenses.save()?;
        }

        let budgets_removed = self.storage.budgets.delete_for_category(id)?;
        if budgets_removed > 0 {
            self.storage.budgets.save()?;
        }

        self.storage
            .log_delete(EntityType::Category, category.id, Some(user_id), &category);
        tracing::info!(
            category = %category.id,
            expenses_reassigned,
            budgets_removed,
            "deleted category"
        );

        Ok(CategoryDeletion {
            category,
            expenses_reassigned,
            budgets_removed,
        })
    }

    /// A category the user may change
    ///
    /// Globals are visible but read-only; another user's category does not
    /// exist as far as this user can tell.
    fn owned(&self, user_id: UserId, id: CategoryId) -> SpendResult<Category> {
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| SpendError::category_not_found(id.to_string()))?;

        if category.is_global() {
            return Err(SpendError::Forbidden(format!(
                "Global category '{}' cannot be modified",
                category.name
            )));
        }
        if !category.is_owned_by(user_id) {
            return Err(SpendError::category_not_found(id.to_string()));
        }

        Ok(category)
    }

    fn ensure_name_free(&self, category: &Category) -> SpendResult<()> {
        match self.storage.categories.find_conflict(category)? {
            Some(existing) => Err(SpendError::Duplicate {
                entity_type: "Category",
                identifier: existing.name,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use crate::models::{Budget, Currency, Expense, Money, MonthPeriod, UNCATEGORIZED};
    use crate::storage::ExpenseQuery;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.into(),
            color: None,
        }
    }

    #[test]
    fn test_create_custom_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let user = UserId::new();

        let pets = service.create(user, new_category("Pets")).unwrap();
        assert_eq!(pets.color, DEFAULT_COLOR);
        assert!(pets.is_owned_by(user));

        let visible = service.list(user).unwrap();
        assert!(visible.iter().any(|c| c.id == pets.id));
        assert!(visible.iter().any(|c| c.name == "Food"));
        assert!(!service.list(UserId::new()).unwrap().iter().any(|c| c.id == pets.id));
    }

    #[test]
    fn test_create_rejects_global_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let err = service.create(UserId::new(), new_category("food")).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_create_rejects_bad_color() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let input = NewCategory {
            name: "Pets".into(),
            color: Some("blue".into()),
        };
        match service.create(UserId::new(), input) {
            Err(SpendError::InvalidFields(fields)) => assert_eq!(fields[0].field, "color"),
            other => panic!("expected field error, got {:?}", other),
        }
    }

    #[test]
    fn test_global_is_forbidden_foreign_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let alice = UserId::new();
        let bob = UserId::new();

        let food = service.find(alice, "Food").unwrap();
        assert!(matches!(
            service.delete(alice, food.id),
            Err(SpendError::Forbidden(_))
        ));

        let pets = service.create(alice, new_category("Pets")).unwrap();
        assert!(service
            .update(bob, pets.id, CategoryChanges::default())
            .unwrap_err()
            .is_not_found());
        assert!(service.delete(bob, pets.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_rename_propagates() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let user = UserId::new();
        let pets = service.create(user, new_category("Pets")).unwrap();

        let mut expense = Expense::new(user, Money::from_cents(500), Currency::Usd, "Kibble", Utc::now());
        expense.set_category(Some(&pets));
        storage.expenses.upsert(expense.clone()).unwrap();

        let budget = Budget::new(user, Some(&pets), MonthPeriod::current(), Money::from_cents(100));
        storage.budgets.upsert(budget.clone()).unwrap();

        let changes = CategoryChanges {
            name: Some("Animals".into()),
            color: None,
        };
        service.update(user, pets.id, changes).unwrap();

        assert_eq!(storage.expenses.get(expense.id).unwrap().unwrap().category, "Animals");
        assert_eq!(storage.budgets.get(budget.id).unwrap().unwrap().category, "Animals");
    }

    #[test]
    fn test_rename_into_existing_name_conflicts() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let user = UserId::new();
        service.create(user, new_category("Pets")).unwrap();
        let toys = service.create(user, new_category("Toys")).unwrap();

        let changes = CategoryChanges {
            name: Some("PETS".into()),
            color: None,
        };
        assert!(service.update(user, toys.id, changes).unwrap_err().is_conflict());
    }

    #[test]
    fn test_delete_reassigns_expenses_and_drops_budgets() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let user = UserId::new();
        let pets = service.create(user, new_category("Pets")).unwrap();

        for cents in [100, 200, 300] {
            let mut e = Expense::new(user, Money::from_cents(cents), Currency::Ngn, "Vet", Utc::now());
            e.set_category(Some(&pets));
            storage.expenses.upsert(e).unwrap();
        }
        storage
            .budgets
            .upsert(Budget::new(user, Some(&pets), MonthPeriod::current(), Money::from_cents(100)))
            .unwrap();
        storage
            .budgets
            .upsert(Budget::new(user, None, MonthPeriod::current(), Money::from_cents(100)))
            .unwrap();

        let deletion = service.delete(user, pets.id).unwrap();
        assert_eq!(deletion.expenses_reassigned, 3);
        assert_eq!(deletion.budgets_removed, 1);

        let expenses = storage.expenses.find(&ExpenseQuery::for_user(user)).unwrap();
        assert!(expenses
            .iter()
            .all(|e| e.category == UNCATEGORIZED && e.category_id.is_none()));
        assert_eq!(storage.budgets.list_for_user(user, None).unwrap().len(), 1);
        assert!(storage.categories.get(pets.id).unwrap().is_none());
    }

    #[test]
    fn test_resolve_by_id_or_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let alice = UserId::new();
        let bob = UserId::new();
        let pets = service.create(alice, new_category("Pets")).unwrap();

        assert_eq!(
            service.resolve(alice, None, Some("pets")).unwrap().unwrap().id,
            pets.id
        );
        assert!(service.resolve(alice, None, None).unwrap().is_none());
        assert!(service.resolve(bob, Some(pets.id), None).unwrap_err().is_validation());
        assert!(service.resolve(bob, None, Some("Pets")).unwrap_err().is_validation());
    }
}
