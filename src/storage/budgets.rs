//! Budget repository for JSON storage
//!
//! Manages loading and saving budgets to budgets.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::SpendError;
use crate::models::{Budget, BudgetId, BudgetKey, Category, CategoryId, MonthPeriod, UserId};

use super::json_file::JsonFile;
use super::{read_lock, write_lock};

/// Serializable budget data
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    #[serde(default)]
    budgets: Vec<Budget>,
}

/// Newest month first, overall budgets ahead of category budgets
fn budget_order(a: &Budget, b: &Budget) -> std::cmp::Ordering {
    b.period_start
        .cmp(&a.period_start)
        .then_with(|| a.category_id.is_some().cmp(&b.category_id.is_some()))
        .then_with(|| a.category.to_lowercase().cmp(&b.category.to_lowercase()))
}

/// Repository for budget persistence
pub struct BudgetRepository {
    file: JsonFile<BudgetData>,
    budgets: RwLock<HashMap<BudgetId, Budget>>,
}

impl BudgetRepository {
    /// Create a new budget repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonFile::new(path),
            budgets: RwLock::new(HashMap::new()),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> Result<(), SpendError> {
        let file_data = self.file.load()?;

        let mut budgets = write_lock(&self.budgets)?;
        budgets.clear();
        for budget in file_data.budgets {
            budgets.insert(budget.id, budget);
        }

        Ok(())
    }

    /// Save budgets to disk
    pub fn save(&self) -> Result<(), SpendError> {
        let budgets = write_lock(&self.budgets)?;

        let mut list: Vec<_> = budgets.values().cloned().collect();
        list.sort_by(budget_order);

        self.file.store(&BudgetData { budgets: list })
    }

    /// Get a budget by ID
    pub fn get(&self, id: BudgetId) -> Result<Option<Budget>, SpendError> {
        let budgets = read_lock(&self.budgets)?;
        Ok(budgets.get(&id).cloned())
    }

    /// A user's budgets, optionally limited to one month
    pub fn list_for_user(
        &self,
        user_id: UserId,
        period: Option<MonthPeriod>,
    ) -> Result<Vec<Budget>, SpendError> {
        let budgets = read_lock(&self.budgets)?;
        let mut list: Vec<_> = budgets
            .values()
            .filter(|b| b.user_id == user_id)
            .filter(|b| period.map_or(true, |p| b.period() == p))
            .cloned()
            .collect();
        list.sort_by(budget_order);
        Ok(list)
    }

    /// Find the budget holding a uniqueness key
    pub fn find_by_key(&self, key: &BudgetKey) -> Result<Option<Budget>, SpendError> {
        let budgets = read_lock(&self.budgets)?;
        Ok(budgets.values().find(|b| b.key() == *key).cloned())
    }

    /// Insert or update a budget unless another budget already holds its key
    pub fn upsert(&self, budget: Budget) -> Result<(), SpendError> {
        let mut budgets = write_lock(&self.budgets)?;

        let key = budget.key();
        if budgets.values().any(|b| b.id != budget.id && b.key() == key) {
            return Err(SpendError::Duplicate {
                entity_type: "Budget",
                identifier: format!("{} for {}", budget.category, key.period),
            });
        }

        budgets.insert(budget.id, budget);
        Ok(())
    }

    /// Delete a budget
    pub fn delete(&self, id: BudgetId) -> Result<bool, SpendError> {
        let mut budgets = write_lock(&self.budgets)?;
        Ok(budgets.remove(&id).is_some())
    }

    /// Delete every budget for a category, returning how many were removed
    pub fn delete_for_category(&self, category_id: CategoryId) -> Result<usize, SpendError> {
        let mut budgets = write_lock(&self.budgets)?;
        let before = budgets.len();
        budgets.retain(|_, b| b.category_id != Some(category_id));
        Ok(before - budgets.len())
    }

    /// Copy a renamed category's name onto its budgets, returning how many changed
    pub fn rename_category(&self, category: &Category) -> Result<usize, SpendError> {
        let mut budgets = write_lock(&self.budgets)?;

        let mut changed = 0;
        for budget in budgets.values_mut() {
            if budget.category_id == Some(category.id) && budget.category != category.name {
                budget.category = category.name.clone();
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Count budgets
    pub fn count(&self) -> Result<usize, SpendError> {
        let budgets = read_lock(&self.budgets)?;
        Ok(budgets.len())
    }
}
