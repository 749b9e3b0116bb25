//! Product and stock endpoints
//!
//! Stock movement routes keep their Spanish names (`entrada`, `salida`,
//! `alertas`, `precio`, and the `cantidad`/`nombre` parameters) as published
//! to existing clients.

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;

use hucha_core::Error;
use hucha_core::domain::product::{Product, ProductInput, ProductUpdateInput};

use super::{ApiError, parse_field, require_field};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
        .route("/sku/{sku}", get(by_sku))
        .route("/{id}/stock/entrada", post(stock_in))
        .route("/{id}/stock/salida", post(stock_out))
        .route("/alertas", get(low_stock))
        .route("/search", get(search))
        .route("/precio", get(price_filter))
}

#[derive(Debug, Deserialize)]
struct StockQuery {
    cantidad: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    nombre: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceQuery {
    min: Option<String>,
    max: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return Err(fail(Error::validation("body", rejection.body_text()))),
    };
    let product = state.products.create(input).await.map_err(fail)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .products
        .list()
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(products))
}

async fn get_one(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let id = parse_field("id", &id).map_err(fail)?;
    let product = state.products.get(id).await.map_err(fail)?;
    Ok(Json(product))
}

async fn by_sku(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(sku): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .products
        .get_by_sku(&sku)
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(product))
}

async fn update(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdateInput>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let id = parse_field("id", &id).map_err(fail)?;
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return Err(fail(Error::validation("body", rejection.body_text()))),
    };
    let product = state.products.update(id, input).await.map_err(fail)?;
    Ok(Json(product))
}

async fn delete_one(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let id = parse_field("id", &id).map_err(fail)?;
    state.products.delete(id).await.map_err(fail)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stock_in(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Product>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let id = parse_field("id", &id).map_err(fail)?;
    let cantidad = require_field("cantidad", query.cantidad.as_deref()).map_err(fail)?;
    let product = state.products.stock_in(id, cantidad).await.map_err(fail)?;
    Ok(Json(product))
}

async fn stock_out(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Product>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let id = parse_field("id", &id).map_err(fail)?;
    let cantidad = require_field("cantidad", query.cantidad.as_deref()).map_err(fail)?;
    let product = state.products.stock_out(id, cantidad).await.map_err(fail)?;
    Ok(Json(product))
}

async fn low_stock(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .products
        .low_stock()
        .await
        .map_err(|e| ApiError::new(e, uri.path()))?;
    Ok(Json(products))
}

async fn search(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let nombre = query
        .nombre
        .ok_or_else(|| fail(Error::validation("nombre", "nombre is required")))?;
    let products = state.products.search_by_name(&nombre).await.map_err(fail)?;
    Ok(Json(products))
}

async fn price_filter(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PriceQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let fail = |e: Error| ApiError::new(e, uri.path());
    let min: Decimal = require_field("min", query.min.as_deref()).map_err(fail)?;
    let max: Decimal = require_field("max", query.max.as_deref()).map_err(fail)?;
    let products = state.products.filter_by_price(min, max).await.map_err(fail)?;
    Ok(Json(products))
}
