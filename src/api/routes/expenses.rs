use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::{
    auth::AuthUser,
    extract::{ApiJson, ApiQuery},
    state::AppState,
    validate::{nullable, Validator},
};
use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, ExpenseId};
use crate::services::{
    ExpenseChanges, ExpenseFilter, ExpensePage, ExpenseService, NewExpense, Pagination,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    from: Option<String>,
    to: Option<String>,
    category_id: Option<String>,
    currency: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseBody {
    amount: Option<f64>,
    currency: Option<String>,
    description: Option<String>,
    category_id: Option<String>,
    category: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseBody {
    amount: Option<f64>,
    currency: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    category_id: Option<Option<String>>,
    category: Option<String>,
    date: Option<String>,
}

fn expense_id(raw: &str) -> SpendResult<ExpenseId> {
    raw.parse()
        .map_err(|_| SpendError::expense_not_found(raw))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<ListParams>,
) -> SpendResult<Json<ExpensePage>> {
    let mut v = Validator::new();
    let filter = ExpenseFilter {
        range: v.range(params.from.as_deref(), params.to.as_deref(), false),
        category_id: v.category_id("categoryId", params.category_id.as_deref()),
        currency: v.currency("currency", params.currency.as_deref()),
    };
    let page = v.number("page", params.page.as_deref());
    let limit = v.number("limit", params.limit.as_deref());
    v.finish()?;

    let pagination = Pagination::new(page, limit)?;
    let user_id = user.id();
    let page = state
        .blocking(move |storage| ExpenseService::new(storage).list(user_id, &filter, pagination))
        .await?;
    Ok(Json(page))
}

pub async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateExpenseBody>,
) -> SpendResult<(StatusCode, Json<Expense>)> {
    let mut v = Validator::new();
    let amount = v.required("amount", body.amount);
    let amount = v.amount("amount", amount);
    let currency = v.required("currency", body.currency);
    let currency = v.currency("currency", currency.as_deref());
    let description = v.required("description", body.description);
    let category_id = v.category_id("categoryId", body.category_id.as_deref());
    let date = v.instant("date", body.date.as_deref());
    v.finish()?;

    let (Some(amount), Some(currency), Some(description)) = (amount, currency, description) else {
        return Err(SpendError::Validation("Incomplete expense".into()));
    };

    let input = NewExpense {
        amount,
        currency,
        description,
        category_id,
        category: body.category,
        date,
    };
    let user_id = user.id();
    let expense = state
        .blocking(move |storage| ExpenseService::new(storage).create(user_id, input))
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn get_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> SpendResult<Json<Expense>> {
    let id = expense_id(&id)?;
    let user_id = user.id();
    let expense = state
        .blocking(move |storage| ExpenseService::new(storage).get(user_id, id))
        .await?;
    Ok(Json(expense))
}

pub async fn update_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateExpenseBody>,
) -> SpendResult<Json<Expense>> {
    let id = expense_id(&id)?;

    let mut v = Validator::new();
    let category_id = match body.category_id {
        Some(Some(raw)) => Some(v.category_id("categoryId", Some(&raw))),
        Some(None) => Some(None),
        None => None,
    };
    let changes = ExpenseChanges {
        amount: v.amount("amount", body.amount),
        currency: v.currency("currency", body.currency.as_deref()),
        description: body.description,
        category_id,
        category: body.category,
        date: v.instant("date", body.date.as_deref()),
    };
    v.finish()?;

    let user_id = user.id();
    let expense = state
        .blocking(move |storage| ExpenseService::new(storage).update(user_id, id, changes))
        .await?;
    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> SpendResult<StatusCode> {
    let id = expense_id(&id)?;
    let user_id = user.id();
    state
        .blocking(move |storage| ExpenseService::new(storage).delete(user_id, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
