//! Budget service
//!
//! Monthly spending caps per category, or overall when no category is
//! given. A user holds at most one budget per category per month; the
//! conflict is checked here before writing and again by the repository
//! under its lock.

use chrono::{DateTime, Utc};

use crate::audit::EntityType;
use crate::error::{SpendError, SpendResult};
use crate::models::{Budget, BudgetId, BudgetKey, CategoryId, Money, MonthPeriod, UserId};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Fields accepted when creating a budget
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub amount: Money,
    pub category_id: Option<CategoryId>,
    /// Category by name, used when no id is given
    pub category: Option<String>,
    /// Any instant in the budgeted month
    pub period_start: DateTime<Utc>,
}

/// Partial update of a budget
///
/// `category_id: Some(None)` turns the budget into an overall budget.
#[derive(Debug, Clone, Default)]
pub struct BudgetChanges {
    pub amount: Option<Money>,
    pub category_id: Option<Option<CategoryId>>,
    pub category: Option<String>,
    pub period_start: Option<DateTime<Utc>>,
}

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The user's budgets, optionally for one month
    pub fn list(&self, user_id: UserId, period: Option<MonthPeriod>) -> SpendResult<Vec<Budget>> {
        self.storage.budgets.list_for_user(user_id, period)
    }

    pub fn get(&self, user_id: UserId, id: BudgetId) -> SpendResult<Budget> {
        self.storage
            .budgets
            .get(id)?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| SpendError::budget_not_found(id.to_string()))
    }

    /// Create a budget for the month containing `period_start`
    pub fn create(&self, user_id: UserId, input: NewBudget) -> SpendResult<Budget> {
        let category = CategoryService::new(self.storage).resolve(
            user_id,
            input.category_id,
            input.category.as_deref(),
        )?;
        let period = budget_period(input.period_start)?;

        let budget = Budget::new(user_id, category.as_ref(), period, input.amount);
        budget
            .validate()
            .map_err(|e| SpendError::invalid_field(e.field(), e.to_string()))?;

        self.ensure_key_free(&budget)?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage
            .log_create(EntityType::Budget, budget.id, Some(user_id), &budget);

        Ok(budget)
    }

    /// Apply a partial update, re-checking uniqueness when the key moves
    pub fn update(
        &self,
        user_id: UserId,
        id: BudgetId,
        changes: BudgetChanges,
    ) -> SpendResult<Budget> {
        let mut budget = self.get(user_id, id)?;
        let before = budget.clone();

        if let Some(amount) = changes.amount {
            budget.set_amount(amount);
        }
        if let Some(start) = changes.period_start {
            budget.set_period(budget_period(start)?);
        }

        let categories = CategoryService::new(self.storage);
        match (changes.category_id, changes.category) {
            (Some(Some(category_id)), _) => {
                let category = categories.resolve(user_id, Some(category_id), None)?;
                budget.set_category(category.as_ref());
            }
            (Some(None), _) => budget.set_category(None),
            (None, Some(name)) => {
                let category = categories.resolve(user_id, None, Some(&name))?;
                budget.set_category(category.as_ref());
            }
            (None, None) => {}
        }

        budget
            .validate()
            .map_err(|e| SpendError::invalid_field(e.field(), e.to_string()))?;

        if budget.key() != before.key() {
            self.ensure_key_free(&budget)?;
        }

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage
            .log_update(EntityType::Budget, budget.id, Some(user_id), &before, &budget);

        Ok(budget)
    }

    pub fn delete(&self, user_id: UserId, id: BudgetId) -> SpendResult<Budget> {
        let budget = self.get(user_id, id)?;

        self.storage.budgets.delete(id)?;
        self.storage.budgets.save()?;

        self.storage
            .log_delete(EntityType::Budget, budget.id, Some(user_id), &budget);

        Ok(budget)
    }

    fn ensure_key_free(&self, budget: &Budget) -> SpendResult<()> {
        let key: BudgetKey = budget.key();
        match self.storage.budgets.find_by_key(&key)? {
            Some(existing) if existing.id != budget.id => Err(SpendError::Duplicate {
                entity_type: "Budget",
                identifier: format!("{} for {}", existing.category, key.period),
            }),
            _ => Ok(()),
        }
    }
}

/// The canonical month for a requested period start
fn budget_period(start: DateTime<Utc>) -> SpendResult<MonthPeriod> {
    let period = MonthPeriod::containing(start);
    MonthPeriod::new(period.year, period.month)
        .map_err(|e| SpendError::invalid_field("periodStart", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use crate::models::OVERALL_BUDGET;
    use crate::services::category::NewCategory;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn budget_for(category: Option<&str>, day: u32) -> NewBudget {
        NewBudget {
            amount: Money::from_cents(50000),
            category_id: None,
            category: category.map(String::from),
            period_start: Utc.with_ymd_and_hms(2025, 3, day, 15, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_period_is_canonicalized() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        let budget = service.create(UserId::new(), budget_for(None, 17)).unwrap();
        assert_eq!(
            budget.period_start,
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(budget.category, OVERALL_BUDGET);
    }

    #[test]
    fn test_duplicate_in_same_month_conflicts() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        let user = UserId::new();

        service.create(user, budget_for(Some("Food"), 1)).unwrap();
        let err = service.create(user, budget_for(Some("food"), 28)).unwrap_err();
        assert!(err.is_conflict());

        // Overall and other users do not collide
        service.create(user, budget_for(None, 2)).unwrap();
        service
            .create(UserId::new(), budget_for(Some("Food"), 1))
            .unwrap();
    }

    #[test]
    fn test_update_into_taken_key_conflicts() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        let user = UserId::new();

        service.create(user, budget_for(Some("Food"), 1)).unwrap();
        let transport = service.create(user, budget_for(Some("Transport"), 1)).unwrap();

        let changes = BudgetChanges {
            category: Some("Food".into()),
            ..Default::default()
        };
        assert!(service
            .update(user, transport.id, changes)
            .unwrap_err()
            .is_conflict());

        // Changing only the amount keeps the key
        let changes = BudgetChanges {
            amount: Some(Money::from_cents(100)),
            ..Default::default()
        };
        assert_eq!(
            service.update(user, transport.id, changes).unwrap().amount.cents(),
            100
        );
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        let mut input = budget_for(None, 1);
        input.amount = Money::zero();
        match service.create(UserId::new(), input) {
            Err(SpendError::InvalidFields(fields)) => assert_eq!(fields[0].field, "amount"),
            other => panic!("expected field error, got {:?}", other),
        }
    }

    #[test]
    fn test_period_out_of_range_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        let mut input = budget_for(None, 1);
        input.period_start = Utc.with_ymd_and_hms(1999, 12, 1, 0, 0, 0).unwrap();
        assert!(service.create(UserId::new(), input).unwrap_err().is_validation());
    }

    #[test]
    fn test_custom_category_budget_and_ownership() {
        let (_temp_dir, storage) = create_test_storage();
        let alice = UserId::new();
        let pets = CategoryService::new(&storage)
            .create(
                alice,
                NewCategory {
                    name: "Pets".into(),
                    color: None,
                },
            )
            .unwrap();

        let service = BudgetService::new(&storage);
        let mut input = budget_for(None, 1);
        input.category_id = Some(pets.id);
        let budget = service.create(alice, input.clone()).unwrap();
        assert_eq!(budget.category, "Pets");

        assert!(service.create(UserId::new(), input).unwrap_err().is_validation());
        assert!(service.get(UserId::new(), budget.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_by_month_and_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        let user = UserId::new();

        let march = service.create(user, budget_for(None, 1)).unwrap();
        let mut april = budget_for(None, 1);
        april.period_start = Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap();
        service.create(user, april).unwrap();

        let period = MonthPeriod::new(2025, 3).unwrap();
        assert_eq!(service.list(user, Some(period)).unwrap().len(), 1);
        assert_eq!(service.list(user, None).unwrap().len(), 2);

        service.delete(user, march.id).unwrap();
        assert!(service.list(user, Some(period)).unwrap().is_empty());
    }
}
