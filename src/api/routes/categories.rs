use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{auth::AuthUser, extract::ApiJson, state::AppState, validate::Validator};
use crate::error::{SpendError, SpendResult};
use crate::models::{Category, CategoryId, CategoryKind};
use crate::services::{CategoryChanges, CategoryService, NewCategory};

/// A category as returned by the API, with its derived type
#[derive(Debug, Serialize)]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            kind: category.kind(),
            category,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    name: Option<String>,
    color: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCategory {
    pub deleted: CategoryView,
    pub expenses_reassigned: usize,
    pub budgets_removed: usize,
}

pub(crate) fn category_id(raw: &str) -> SpendResult<CategoryId> {
    raw.parse()
        .map_err(|_| SpendError::category_not_found(raw))
}

pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> SpendResult<Json<Vec<CategoryView>>> {
    let user_id = user.id();
    let categories = state
        .blocking(move |storage| CategoryService::new(storage).list(user_id))
        .await?;
    Ok(Json(categories.into_iter().map(CategoryView::from).collect()))
}

pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CategoryBody>,
) -> SpendResult<(StatusCode, Json<CategoryView>)> {
    let mut v = Validator::new();
    let name = v.required("name", body.name);
    v.finish()?;

    let input = NewCategory {
        name: name.unwrap_or_default(),
        color: body.color,
    };
    let user_id = user.id();
    let category = state
        .blocking(move |storage| CategoryService::new(storage).create(user_id, input))
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CategoryBody>,
) -> SpendResult<Json<CategoryView>> {
    let id = category_id(&id)?;
    let changes = CategoryChanges {
        name: body.name,
        color: body.color,
    };
    let user_id = user.id();
    let category = state
        .blocking(move |storage| CategoryService::new(storage).update(user_id, id, changes))
        .await?;
    Ok(Json(category.into()))
}

pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> SpendResult<Json<DeletedCategory>> {
    let id = category_id(&id)?;
    let user_id = user.id();
    let deletion = state
        .blocking(move |storage| CategoryService::new(storage).delete(user_id, id))
        .await?;
    Ok(Json(DeletedCategory {
        deleted: deletion.category.into(),
        expenses_reassigned: deletion.expenses_reassigned,
        budgets_removed: deletion.budgets_removed,
    }))
}
