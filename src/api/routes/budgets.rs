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
use crate::models::{Budget, BudgetId};
use crate::reports::MonthlyReport;
use crate::services::{BudgetChanges, BudgetService, NewBudget};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    year: Option<String>,
    month: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetBody {
    amount: Option<f64>,
    category_id: Option<String>,
    category: Option<String>,
    period_start: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetBody {
    amount: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    category_id: Option<Option<String>>,
    category: Option<String>,
    period_start: Option<String>,
}

fn budget_id(raw: &str) -> SpendResult<BudgetId> {
    raw.parse()
        .map_err(|_| SpendError::budget_not_found(raw))
}

pub async fn list_budgets(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<ListParams>,
) -> SpendResult<Json<Vec<Budget>>> {
    let mut v = Validator::new();
    let year: Option<i32> = v.number("year", params.year.as_deref());
    let month: Option<u32> = v.number("month", params.month.as_deref());
    if year.is_some() != month.is_some() {
        v.fail(
            if year.is_some() { "month" } else { "year" },
            "year and month must be given together",
        );
    }
    v.finish()?;

    let period = match (year, month) {
        (Some(year), Some(month)) => Some(MonthlyReport::period(year, month)?),
        _ => None,
    };

    let user_id = user.id();
    let budgets = state
        .blocking(move |storage| BudgetService::new(storage).list(user_id, period))
        .await?;
    Ok(Json(budgets))
}

pub async fn create_budget(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateBudgetBody>,
) -> SpendResult<(StatusCode, Json<Budget>)> {
    let mut v = Validator::new();
    let amount = v.required("amount", body.amount);
    let amount = v.amount("amount", amount);
    let category_id = v.category_id("categoryId", body.category_id.as_deref());
    let period_start = v.required("periodStart", body.period_start);
    let period_start = v.instant("periodStart", period_start.as_deref());
    v.finish()?;

    let (Some(amount), Some(period_start)) = (amount, period_start) else {
        return Err(SpendError::Validation("Incomplete budget".into()));
    };

    let input = NewBudget {
        amount,
        category_id,
        category: body.category,
        period_start,
    };
    let user_id = user.id();
    let budget = state
        .blocking(move |storage| BudgetService::new(storage).create(user_id, input))
        .await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn get_budget(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> SpendResult<Json<Budget>> {
    let id = budget_id(&id)?;
    let user_id = user.id();
    let budget = state
        .blocking(move |storage| BudgetService::new(storage).get(user_id, id))
        .await?;
    Ok(Json(budget))
}

pub async fn update_budget(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateBudgetBody>,
) -> SpendResult<Json<Budget>> {
    let id = budget_id(&id)?;

    let mut v = Validator::new();
    let category_id = match body.category_id {
        Some(Some(raw)) => Some(v.category_id("categoryId", Some(&raw))),
        Some(None) => Some(None),
        None => None,
    };
    let changes = BudgetChanges {
        amount: v.amount("amount", body.amount),
        category_id,
        category: body.category,
        period_start: v.instant("periodStart", body.period_start.as_deref()),
    };
    v.finish()?;

    let user_id = user.id();
    let budget = state
        .blocking(move |storage| BudgetService::new(storage).update(user_id, id, changes))
        .await?;
    Ok(Json(budget))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> SpendResult<StatusCode> {
    let id = budget_id(&id)?;
    let user_id = user.id();
    state
        .blocking(move |storage| BudgetService::new(storage).delete(user_id, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
