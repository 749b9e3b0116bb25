//! Expense endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use hucha_core::Error;
use hucha_core::domain::expense::{
    CategoryReport, Expense, ExpenseInput, MonthReport, PeriodReport,
};
use hucha_core::error::ValidationErrors;

use super::{ApiError, parse_field};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
        .route("/category/{category}", get(by_category))
        .route("/category/{category}/between", get(by_category_between))
        .route("/payment-method/{method}", get(by_payment_method))
        .route("/between", get(between))
        .route("/reports/by-category", get(report_by_category))
        .route("/reports/period", get(report_period))
        .route("/reports/current-month", get(report_current_month))
}

#[derive(Debug, Deserialize)]
struct DateRangeQuery {
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

impl DateRangeQuery {
    /// Both bounds are required; failures for each are reported together.
    fn parse(&self) -> Result<(NaiveDate, NaiveDate), Error> {
        let mut errors = ValidationErrors::new();
        let mut bound = |field: &str, raw: Option<&str>| match raw {
            None => {
                errors.push(field, format!("{field} is required"));
                None
            }
            Some(raw) => match raw.parse::<NaiveDate>() {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(field, format!("{field} must be a date in YYYY-MM-DD format"));
                    None
                }
            },
        };
        let start = bound("startDate", self.start_date.as_deref());
        let end = bound("endDate", self.end_date.as_deref());
        errors.into_result()?;
        Ok((start.unwrap(), end.unwrap()))
    }
}

fn decode_body(
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> Result<ExpenseInput, Error> {
    match payload {
        Ok(Json(input)) => Ok(input),
        Err(rejection) => Err(Error::validation("body", rejection.body_text())),
    }
}

async fn create(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let input = decode_body(payload).map_err(fail)?;
    let expense = state.expenses.create(input).await.map_err(fail)?;
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = state
        .expenses
        .list()
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(expenses))
}

async fn get_one(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<Expense>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let id = parse_field("id", &id).map_err(fail)?;
    let expense = state.expenses.get(id).await.map_err(fail)?;
    Ok(Json(expense))
}

async fn update(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> Result<Json<Expense>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let id = parse_field("id", &id).map_err(fail)?;
    let input = decode_body(payload).map_err(fail)?;
    let expense = state.expenses.update(id, input).await.map_err(fail)?;
    Ok(Json(expense))
}

async fn delete_one(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let id = parse_field("id", &id).map_err(fail)?;
    state.expenses.delete(id).await.map_err(fail)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn by_category(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(category): Path<String>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = state
        .expenses
        .list_by_category(&category)
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(expenses))
}

async fn by_payment_method(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(method): Path<String>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = state
        .expenses
        .list_by_payment_method(&method)
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(expenses))
}

async fn between(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let (start, end) = range.parse().map_err(fail)?;
    let expenses = state.expenses.list_between(start, end).await.map_err(fail)?;
    Ok(Json(expenses))
}

async fn by_category_between(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(category): Path<String>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let (start, end) = range.parse().map_err(fail)?;
    let expenses = state
        .expenses
        .list_by_category_between(&category, start, end)
        .await
        .map_err(fail)?;
    Ok(Json(expenses))
}

async fn report_by_category(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<CategoryReport>>, ApiError> {
    let report = state
        .expenses
        .report_by_category()
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(report))
}

async fn report_period(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<PeriodReport>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let (start, end) = range.parse().map_err(fail)?;
    let report = state.expenses.report_period(start, end).await.map_err(fail)?;
    Ok(Json(report))
}

async fn report_current_month(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<MonthReport>, ApiError> {
    let report = state
        .expenses
        .report_current_month()
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(report))
}
