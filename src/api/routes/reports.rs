use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::api::{auth::AuthUser, extract::ApiQuery, state::AppState, validate::Validator};
use crate::error::{SpendError, SpendResult};
use crate::export::{export_expenses_csv, ExportFormat};
use crate::models::{DateRange, MonthPeriod};
use crate::reports::{CategoryReport, MonthlyReport, TrendReport};

#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    months: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    from: Option<String>,
    to: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
    year: Option<String>,
    month: Option<String>,
}

fn required_range(params: &RangeParams) -> SpendResult<DateRange> {
    let mut v = Validator::new();
    let range = v.range(params.from.as_deref(), params.to.as_deref(), true);
    v.finish()?;
    range.ok_or_else(|| SpendError::invalid_field("from", "from and to are required"))
}

pub async fn trends(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<TrendParams>,
) -> SpendResult<Json<TrendReport>> {
    let mut v = Validator::new();
    let months = v.number("months", params.months.as_deref());
    v.finish()?;

    let months = TrendReport::validate_months(months.unwrap_or(state.settings.default_trend_months))?;
    let user_id = user.id();
    let report = state
        .blocking(move |storage| {
            TrendReport::generate(storage, user_id, months, MonthPeriod::current())
        })
        .await?;
    Ok(Json(report))
}

pub async fn categories(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> SpendResult<Json<CategoryReport>> {
    let range = required_range(&params)?;
    let user_id = user.id();
    let report = state
        .blocking(move |storage| CategoryReport::generate(storage, user_id, range))
        .await?;
    Ok(Json(report))
}

pub async fn monthly(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<MonthParams>,
) -> SpendResult<Json<MonthlyReport>> {
    let mut v = Validator::new();
    let year = v.required("year", params.year);
    let year: Option<i32> = v.number("year", year.as_deref());
    let month = v.required("month", params.month);
    let month: Option<u32> = v.number("month", month.as_deref());
    v.finish()?;

    let period = MonthlyReport::period(year.unwrap_or_default(), month.unwrap_or_default())?;
    let user_id = user.id();
    let report = state
        .blocking(move |storage| MonthlyReport::generate(storage, user_id, period))
        .await?;
    Ok(Json(report))
}

pub async fn export(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<RangeParams>,
) -> SpendResult<Response> {
    ExportFormat::parse(params.format.as_deref())?;
    let range = required_range(&params)?;

    let user_id = user.id();
    let limit = state.settings.export_row_limit;
    let export = state
        .blocking(move |storage| export_expenses_csv(storage, user_id, range, limit))
        .await?;
    tracing::info!(user = %user.id(), rows = export.rows, "exported expenses");

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}
