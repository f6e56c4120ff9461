//! Category repository for JSON storage
//!
//! Manages loading and saving global and custom categories to
//! categories.json. Name uniqueness per scope is re-checked under the write
//! lock on every insert, so two racing creates cannot both succeed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendError;
use crate::models::{Category, CategoryId, UserId};

use super::json_file::JsonFile;
use super::{read_lock, write_lock};

/// Serializable category collection
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    file: JsonFile<CategoryData>,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

/// Globals first, then alphabetical
fn display_order(a: &Category, b: &Category) -> std::cmp::Ordering {
    b.is_global()
        .cmp(&a.is_global())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Whether two categories share a naming scope
fn shares_scope(a: &Category, b: &Category) -> bool {
    a.is_global() || b.is_global() || a.user_id == b.user_id
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> Result<(), SpendError> {
        let file_data = self.file.load()?;

        let mut categories = write_lock(&self.categories)?;
        categories.clear();
        for category in file_data.categories {
            categories.insert(category.id, category);
        }

        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> Result<(), SpendError> {
        let categories = write_lock(&self.categories)?;

        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(display_order);

        self.file.store(&CategoryData { categories: list })
    }

    /// Get a category by ID
    pub fn get(&self, id: CategoryId) -> Result<Option<Category>, SpendError> {
        let categories = read_lock(&self.categories)?;
        Ok(categories.get(&id).cloned())
    }

    /// Get all categories
    pub fn get_all(&self) -> Result<Vec<Category>, SpendError> {
        let categories = read_lock(&self.categories)?;
        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(display_order);
        Ok(list)
    }

    /// Get global categories plus those owned by `user_id`
    pub fn get_visible_to(&self, user_id: UserId) -> Result<Vec<Category>, SpendError> {
        let categories = read_lock(&self.categories)?;
        let mut list: Vec<_> = categories
            .values()
            .filter(|c| c.is_visible_to(user_id))
            .cloned()
            .collect();
        list.sort_by(display_order);
        Ok(list)
    }

    /// Find a category visible to `user_id` by name (case-insensitive)
    pub fn find_by_name(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<Option<Category>, SpendError> {
        let categories = read_lock(&self.categories)?;
        // Scoped name uniqueness leaves at most one visible match
        Ok(categories
            .values()
            .find(|c| c.is_visible_to(user_id) && c.name_matches(name))
            .cloned())
    }

    /// Find another category in the same naming scope with the same name
    pub fn find_conflict(&self, candidate: &Category) -> Result<Option<Category>, SpendError> {
        let categories = read_lock(&self.categories)?;
        Ok(Self::conflict_in(&categories, candidate).cloned())
    }

    fn conflict_in<'a>(
        categories: &'a HashMap<CategoryId, Category>,
        candidate: &Category,
    ) -> Option<&'a Category> {
        categories.values().find(|c| {
            c.id != candidate.id && shares_scope(c, candidate) && c.name_matches(&candidate.name)
        })
    }

    /// Insert or update a category, rejecting a name already used in scope
    pub fn upsert(&self, category: Category) -> Result<(), SpendError> {
        let mut categories = write_lock(&self.categories)?;

        if Self::conflict_in(&categories, &category).is_some() {
            return Err(SpendError::Duplicate {
                entity_type: "Category",
                identifier: category.name,
            });
        }

        categories.insert(category.id, category);
        Ok(())
    }

    /// Delete a category
    pub fn delete(&self, id: CategoryId) -> Result<bool, SpendError> {
        let mut categories = write_lock(&self.categories)?;
        Ok(categories.remove(&id).is_some())
    }

    /// Count categories
    pub fn count(&self) -> Result<usize, SpendError> {
        let categories = read_lock(&self.categories)?;
        Ok(categories.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_COLOR;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CategoryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = CategoryRepository::new(temp_dir.path().join("categories.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_visibility_and_order() {
        let (_temp_dir, repo) = create_test_repo();
        let alice = UserId::new();
        let bob = UserId::new();

        repo.upsert(Category::global("Transport", DEFAULT_COLOR)).unwrap();
        repo.upsert(Category::global("Food", DEFAULT_COLOR)).unwrap();
        repo.upsert(Category::custom("Aquarium", DEFAULT_COLOR, alice))
            .unwrap();
        repo.upsert(Category::custom("Books", DEFAULT_COLOR, bob))
            .unwrap();

        let names: Vec<_> = repo
            .get_visible_to(alice)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Food", "Transport", "Aquarium"]);
    }

    #[test]
    fn test_name_unique_within_scope() {
        let (_temp_dir, repo) = create_test_repo();
        let alice = UserId::new();
        let bob = UserId::new();

        repo.upsert(Category::global("Food", DEFAULT_COLOR)).unwrap();
        repo.upsert(Category::custom("Pets", DEFAULT_COLOR, alice))
            .unwrap();

        // Collides with a global
        let err = repo
            .upsert(Category::custom("FOOD", DEFAULT_COLOR, alice))
            .unwrap_err();
        assert!(err.is_conflict());

        // Collides with the owner's own category
        assert!(repo
            .upsert(Category::custom("pets", DEFAULT_COLOR, alice))
            .is_err());

        // Another user may reuse the name
        repo.upsert(Category::custom("Pets", DEFAULT_COLOR, bob))
            .unwrap();
        assert_eq!(repo.count().unwrap(), 3);
    }

    #[test]
    fn test_update_keeps_own_name() {
        let (_temp_dir, repo) = create_test_repo();
        let alice = UserId::new();
        let mut pets = Category::custom("Pets", DEFAULT_COLOR, alice);
        repo.upsert(pets.clone()).unwrap();

        pets.color = "#000000".into();
        repo.upsert(pets.clone()).unwrap();
        assert_eq!(repo.get(pets.id).unwrap().unwrap().color, "#000000");
    }

    #[test]
    fn test_find_by_name_respects_visibility() {
        let (_temp_dir, repo) = create_test_repo();
        let alice = UserId::new();
        let bob = UserId::new();
        repo.upsert(Category::custom("Pets", DEFAULT_COLOR, alice))
            .unwrap();

        assert!(repo.find_by_name(alice, "pets").unwrap().is_some());
        assert!(repo.find_by_name(bob, "pets").unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let category = Category::global("Food", DEFAULT_COLOR);
        repo.upsert(category.clone()).unwrap();
        repo.save().unwrap();

        let repo2 = CategoryRepository::new(temp_dir.path().join("categories.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(category.id).unwrap().unwrap().name, "Food");
    }
}
