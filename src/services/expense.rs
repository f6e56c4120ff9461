//! Expense service
//!
//! Creates, updates and lists a user's expenses. Category references are
//! re-resolved on every write so the denormalized name always matches the
//! category the expense points at.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audit::EntityType;
use crate::error::{SpendError, SpendResult};
use crate::models::{CategoryId, Currency, DateRange, Expense, ExpenseId, Money, UserId};
use crate::services::CategoryService;
use crate::storage::{ExpenseQuery, Storage};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Fields accepted when recording an expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: Money,
    pub currency: Currency,
    pub description: String,
    pub category_id: Option<CategoryId>,
    /// Category by name, used when no id is given
    pub category: Option<String>,
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
}

/// Partial update of an expense
///
/// `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    pub amount: Option<Money>,
    pub currency: Option<Currency>,
    pub description: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Listing filters
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub range: Option<DateRange>,
    pub category_id: Option<CategoryId>,
    pub currency: Option<Currency>,
}

/// 1-based page request
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Validate page and limit
    pub fn new(page: Option<usize>, limit: Option<usize>) -> SpendResult<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);

        let mut problems = Vec::new();
        if page == 0 {
            problems.push(crate::error::FieldError::new("page", "Page must be at least 1"));
        }
        if limit == 0 || limit > MAX_PAGE_SIZE {
            problems.push(crate::error::FieldError::new(
                "limit",
                format!("Limit must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        if !problems.is_empty() {
            return Err(SpendError::InvalidFields(problems));
        }

        Ok(Self { page, limit })
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of expenses plus paging metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a new expense
    pub fn create(&self, user_id: UserId, input: NewExpense) -> SpendResult<Expense> {
        let category = CategoryService::new(self.storage).resolve(
            user_id,
            input.category_id,
            input.category.as_deref(),
        )?;

        let mut expense = Expense::new(
            user_id,
            input.amount,
            input.currency,
            input.description,
            input.date.unwrap_or_else(Utc::now),
        );
        if category.is_some() {
            expense.set_category(category.as_ref());
        }
        expense
            .validate()
            .map_err(|e| SpendError::invalid_field(e.field(), e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage
            .log_create(EntityType::Expense, expense.id, Some(user_id), &expense);

        Ok(expense)
    }

    /// Get one of the user's expenses
    pub fn get(&self, user_id: UserId, id: ExpenseId) -> SpendResult<Expense> {
        self.storage
            .expenses
            .get(id)?
            .filter(|e| e.user_id == user_id)
            .ok_or_else(|| SpendError::expense_not_found(id.to_string()))
    }

    /// Apply a partial update
    pub fn update(
        &self,
        user_id: UserId,
        id: ExpenseId,
        changes: ExpenseChanges,
    ) -> SpendResult<Expense> {
        let mut expense = self.get(user_id, id)?;
        let before = expense.clone();

        if let Some(amount) = changes.amount {
            expense.amount = amount;
        }
        if let Some(currency) = changes.currency {
            expense.currency = currency;
        }
        if let Some(description) = changes.description {
            expense.description = description.trim().to_string();
        }
        if let Some(date) = changes.date {
            expense.date = date;
        }

        let categories = CategoryService::new(self.storage);
        match (changes.category_id, changes.category) {
            (Some(Some(category_id)), _) => {
                let category = categories.resolve(user_id, Some(category_id), None)?;
                expense.set_category(category.as_ref());
            }
            (Some(None), _) => expense.uncategorize(),
            (None, Some(name)) => {
                let category = categories.resolve(user_id, None, Some(&name))?;
                expense.set_category(category.as_ref());
            }
            (None, None) => {}
        }

        expense
            .validate()
            .map_err(|e| SpendError::invalid_field(e.field(), e.to_string()))?;

        expense.updated_at = Utc::now();
        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage
            .log_update(EntityType::Expense, expense.id, Some(user_id), &before, &expense);

        Ok(expense)
    }

    /// Delete one of the user's expenses
    pub fn delete(&self, user_id: UserId, id: ExpenseId) -> SpendResult<Expense> {
        let expense = self.get(user_id, id)?;

        self.storage.expenses.delete(id)?;
        self.storage.expenses.save()?;

        self.storage
            .log_delete(EntityType::Expense, expense.id, Some(user_id), &expense);

        Ok(expense)
    }

    /// A page of the user's expenses, newest first
    pub fn list(
        &self,
        user_id: UserId,
        filter: &ExpenseFilter,
        pagination: Pagination,
    ) -> SpendResult<ExpensePage> {
        let query = ExpenseQuery {
            user_id,
            range: filter.range,
            category_id: filter.category_id,
            currency: filter.currency,
        };
        let all = self.storage.expenses.find(&query)?;
        let total = all.len();

        let expenses = all
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .collect();

        Ok(ExpensePage {
            expenses,
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: total.div_ceil(pagination.limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SpendwisePaths;
    use crate::models::{MonthPeriod, UNCATEGORIZED};
    use crate::services::category::NewCategory;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn lunch(cents: i64) -> NewExpense {
        NewExpense {
            amount: Money::from_cents(cents),
            currency: Currency::Usd,
            description: "Lunch".into(),
            category_id: None,
            category: None,
            date: None,
        }
    }

    #[test]
    fn test_create_uncategorized_by_default() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let expense = service.create(UserId::new(), lunch(1250)).unwrap();
        assert_eq!(expense.category, UNCATEGORIZED);
        assert!(expense.category_id.is_none());
    }

    #[test]
    fn test_create_with_category_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let mut input = lunch(1250);
        input.category = Some("food".into());
        let expense = service.create(UserId::new(), input).unwrap();
        assert_eq!(expense.category, "Food");
        assert!(expense.category_id.is_some());
    }

    #[test]
    fn test_create_validates_fields() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let err = service.create(UserId::new(), lunch(0)).unwrap_err();
        assert!(err.is_validation());

        let mut input = lunch(100);
        input.description = "x".repeat(201);
        match service.create(UserId::new(), input) {
            Err(SpendError::InvalidFields(fields)) => assert_eq!(fields[0].field, "description"),
            other => panic!("expected field error, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_category_rejected() {
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

        let mut input = lunch(100);
        input.category_id = Some(pets.id);
        let err = ExpenseService::new(&storage)
            .create(UserId::new(), input)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_other_users_expense_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let expense = service.create(UserId::new(), lunch(100)).unwrap();

        let stranger = UserId::new();
        assert!(service.get(stranger, expense.id).unwrap_err().is_not_found());
        assert!(service.delete(stranger, expense.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_partial_update() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let user = UserId::new();

        let mut input = lunch(100);
        input.category = Some("Food".into());
        let expense = service.create(user, input).unwrap();

        let changes = ExpenseChanges {
            amount: Some(Money::from_cents(999)),
            ..Default::default()
        };
        let updated = service.update(user, expense.id, changes).unwrap();
        assert_eq!(updated.amount.cents(), 999);
        assert_eq!(updated.category, "Food");
        assert_eq!(updated.description, "Lunch");

        let changes = ExpenseChanges {
            category_id: Some(None),
            ..Default::default()
        };
        let cleared = service.update(user, expense.id, changes).unwrap();
        assert_eq!(cleared.category, UNCATEGORIZED);
    }

    #[test]
    fn test_list_filters_and_pages() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let user = UserId::new();

        for day in 1..=25 {
            let mut input = lunch(100 * day as i64);
            input.date = Some(Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap());
            if day % 5 == 0 {
                input.currency = Currency::Ngn;
            }
            service.create(user, input).unwrap();
        }

        let page = service
            .list(user, &ExpenseFilter::default(), Pagination::default())
            .unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.expenses.len(), 20);
        assert_eq!(page.expenses[0].amount.cents(), 2500);

        let second = service
            .list(user, &ExpenseFilter::default(), Pagination::new(Some(2), None).unwrap())
            .unwrap();
        assert_eq!(second.expenses.len(), 5);

        let ngn = ExpenseFilter {
            currency: Some(Currency::Ngn),
            ..Default::default()
        };
        assert_eq!(service.list(user, &ngn, Pagination::default()).unwrap().total, 5);

        let february = ExpenseFilter {
            range: Some(DateRange::month(MonthPeriod::new(2025, 2).unwrap())),
            ..Default::default()
        };
        assert_eq!(service.list(user, &february, Pagination::default()).unwrap().total, 0);
    }

    #[test]
    fn test_pagination_bounds() {
        assert!(Pagination::new(Some(0), None).is_err());
        assert!(Pagination::new(None, Some(0)).is_err());
        assert!(Pagination::new(None, Some(101)).is_err());
        assert_eq!(Pagination::new(None, Some(100)).unwrap().limit, 100);
    }
}
