//! Route table and the small handlers that don't warrant their own module

pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod reports;

use axum::{
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{auth::AuthUser, state::AppState};
use crate::error::SpendResult;
use crate::models::UserId;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

/// The caller's profile, without the token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn me(AuthUser(user): AuthUser) -> SpendResult<Json<Profile>> {
    Ok(Json(Profile {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
    }))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/me", get(me))
        .route(
            "/api/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/categories/:id",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route(
            "/api/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route(
            "/api/expenses/:id",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .route(
            "/api/budgets",
            get(budgets::list_budgets).post(budgets::create_budget),
        )
        .route(
            "/api/budgets/:id",
            get(budgets::get_budget)
                .put(budgets::update_budget)
                .delete(budgets::delete_budget),
        )
        .route("/api/reports/trends", get(reports::trends))
        .route("/api/reports/categories", get(reports::categories))
        .route("/api/reports/monthly", get(reports::monthly))
        .route("/api/reports/export", get(reports::export))
}
