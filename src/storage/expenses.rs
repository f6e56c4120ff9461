//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses to expenses.json, with a per-user
//! index so every query starts from one user's expenses only.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendError;
use crate::models::{Category, CategoryId, Currency, DateRange, Expense, ExpenseId, UserId};

use super::json_file::JsonFile;
use super::{read_lock, write_lock};

/// Serializable expense data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Filter over one user's expenses
#[derive(Debug, Clone)]
pub struct ExpenseQuery {
    pub user_id: UserId,
    pub range: Option<DateRange>,
    pub category_id: Option<CategoryId>,
    pub currency: Option<Currency>,
}

impl ExpenseQuery {
    /// Every expense of a user
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            range: None,
            category_id: None,
            currency: None,
        }
    }

    pub fn in_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        expense.user_id == self.user_id
            && self.range.map_or(true, |r| r.contains(expense.date))
            && self
                .category_id
                .map_or(true, |id| expense.category_id == Some(id))
            && self.currency.map_or(true, |c| expense.currency == c)
    }
}

/// Repository for expense persistence with indexing
pub struct ExpenseRepository {
    file: JsonFile<ExpenseData>,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: user_id -> expense_ids
    by_user: RwLock<HashMap<UserId, Vec<ExpenseId>>>,
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
            data: RwLock::new(HashMap::new()),
            by_user: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk and build the user index
    pub fn load(&self) -> Result<(), SpendError> {
        let file_data = self.file.load()?;

        let mut data = write_lock(&self.data)?;
        let mut by_user = write_lock(&self.by_user)?;

        data.clear();
        by_user.clear();

        for expense in file_data.expenses {
            by_user.entry(expense.user_id).or_default().push(expense.id);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Save expenses to disk
    pub fn save(&self) -> Result<(), SpendError> {
        let data = write_lock(&self.data)?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        self.file.store(&ExpenseData { expenses })
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, SpendError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// Expenses matching a query, newest first
    pub fn find(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, SpendError> {
        let data = read_lock(&self.data)?;
        let by_user = read_lock(&self.by_user)?;

        let ids = by_user
            .get(&query.user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut expenses: Vec<_> = ids
            .iter()
            .filter_map(|id| data.get(id))
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), SpendError> {
        let mut data = write_lock(&self.data)?;
        let mut by_user = write_lock(&self.by_user)?;

        if data.get(&expense.id).is_none() {
            by_user.entry(expense.user_id).or_default().push(expense.id);
        }
        data.insert(expense.id, expense);
        Ok(())
    }

    /// Delete an expense
    pub fn delete(&self, id: ExpenseId) -> Result<bool, SpendError> {
        let mut data = write_lock(&self.data)?;
        let mut by_user = write_lock(&self.by_user)?;

        match data.remove(&id) {
            Some(old) => {
                if let Some(ids) = by_user.get_mut(&old.user_id) {
                    ids.retain(|&e| e != id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Uncategorize every expense pointing at `category_id`, returning how many changed
    pub fn clear_category(&self, category_id: CategoryId) -> Result<usize, SpendError> {
        let mut data = write_lock(&self.data)?;

        let mut changed = 0;
        for expense in data.values_mut() {
            if expense.category_id == Some(category_id) {
                expense.uncategorize();
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Copy a renamed category's name onto its expenses, returning how many changed
    pub fn rename_category(&self, category: &Category) -> Result<usize, SpendError> {
        let mut data = write_lock(&self.data)?;

        let mut changed = 0;
        for expense in data.values_mut() {
            if expense.category_id == Some(category.id) && expense.category != category.name {
                expense.category = category.name.clone();
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Count all expenses
    pub fn count(&self) -> Result<usize, SpendError> {
        let data = read_lock(&self.data)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, MonthPeriod, DEFAULT_COLOR, UNCATEGORIZED};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        (temp_dir, repo)
    }

    fn expense(user: UserId, cents: i64, currency: Currency, day: u32) -> Expense {
        Expense::new(
            user,
            Money::from_cents(cents),
            currency,
            format!("Item {}", day),
            Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_find_is_scoped_and_sorted() {
        let (_temp_dir, repo) = create_test_repo();
        let alice = UserId::new();
        let bob = UserId::new();

        repo.upsert(expense(alice, 100, Currency::Usd, 3)).unwrap();
        repo.upsert(expense(alice, 200, Currency::Usd, 9)).unwrap();
        repo.upsert(expense(bob, 300, Currency::Usd, 5)).unwrap();

        let found = repo.find(&ExpenseQuery::for_user(alice)).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].description, "Item 9");
        assert_eq!(found[1].description, "Item 3");
    }

    #[test]
    fn test_query_filters() {
        let (_temp_dir, repo) = create_test_repo();
        let alice = UserId::new();
        let food = Category::global("Food", DEFAULT_COLOR);

        let mut lunch = expense(alice, 100, Currency::Usd, 3);
        lunch.set_category(Some(&food));
        repo.upsert(lunch).unwrap();
        repo.upsert(expense(alice, 500, Currency::Ngn, 4)).unwrap();

        let feb = expense(alice, 700, Currency::Usd, 1);
        let mut feb = feb;
        feb.date = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        repo.upsert(feb).unwrap();

        let january = DateRange::month(MonthPeriod::new(2025, 1).unwrap());
        let query = ExpenseQuery::for_user(alice).in_range(january);
        assert_eq!(repo.find(&query).unwrap().len(), 2);

        let query = ExpenseQuery {
            currency: Some(Currency::Ngn),
            ..ExpenseQuery::for_user(alice)
        };
        assert_eq!(repo.find(&query).unwrap().len(), 1);

        let query = ExpenseQuery {
            category_id: Some(food.id),
            ..ExpenseQuery::for_user(alice)
        };
        assert_eq!(repo.find(&query).unwrap()[0].category, "Food");
    }

    #[test]
    fn test_delete_updates_index() {
        let (_temp_dir, repo) = create_test_repo();
        let alice = UserId::new();
        let e = expense(alice, 100, Currency::Usd, 3);
        repo.upsert(e.clone()).unwrap();

        assert!(repo.delete(e.id).unwrap());
        assert!(!repo.delete(e.id).unwrap());
        assert!(repo.find(&ExpenseQuery::for_user(alice)).unwrap().is_empty());
    }

    #[test]
    fn test_category_cascades() {
        let (_temp_dir, repo) = create_test_repo();
        let alice = UserId::new();
        let mut pets = Category::custom("Pets", DEFAULT_COLOR, alice);

        let mut e = expense(alice, 100, Currency::Usd, 3);
        e.set_category(Some(&pets));
        repo.upsert(e.clone()).unwrap();
        repo.upsert(expense(alice, 200, Currency::Usd, 4)).unwrap();

        pets.name = "Animals".into();
        assert_eq!(repo.rename_category(&pets).unwrap(), 1);
        assert_eq!(repo.get(e.id).unwrap().unwrap().category, "Animals");

        assert_eq!(repo.clear_category(pets.id).unwrap(), 1);
        let cleared = repo.get(e.id).unwrap().unwrap();
        assert_eq!(cleared.category, UNCATEGORIZED);
        assert!(cleared.category_id.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let alice = UserId::new();
        repo.upsert(expense(alice, 100, Currency::Usd, 3)).unwrap();
        repo.save().unwrap();

        let repo2 = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.find(&ExpenseQuery::for_user(alice)).unwrap().len(), 1);
    }
}
