//! Catalog API endpoints: produce, farms, FAQs, and search.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::catalog::{SearchResults, MIN_QUERY_LEN};
use crate::errors::AppError;
use crate::models::{Farm, Faq, ProduceView};
use crate::AppState;

/// Query parameters for produce listing.
#[derive(Debug, Deserialize)]
pub struct ProduceQuery {
    pub category: Option<String>,
    pub season: Option<String>,
}

/// GET /api/produce - List produce items merged with their categories.
pub async fn list_produce(
    State(state): State<AppState>,
    Query(params): Query<ProduceQuery>,
) -> ApiResult<Vec<ProduceView>> {
    let items = state
        .catalog
        .produce(params.category.as_deref(), params.season.as_deref());
    success(items)
}

/// GET /api/produce/:id - Get a single produce item.
pub async fn get_produce(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProduceView> {
    match state.catalog.produce_by_id(&id) {
        Some(view) => success(view),
        None => Err(AppError::NotFound(format!("Produce item {} not found", id))),
    }
}

/// Query parameters for farm listing.
#[derive(Debug, Deserialize)]
pub struct FarmQuery {
    pub location: Option<String>,
}

/// GET /api/farms - List partner farms.
pub async fn list_farms(
    State(state): State<AppState>,
    Query(params): Query<FarmQuery>,
) -> ApiResult<Vec<Farm>> {
    success(state.catalog.farms(params.location.as_deref()))
}

/// Query parameters for FAQ listing.
#[derive(Debug, Deserialize)]
pub struct FaqQuery {
    pub category: Option<String>,
}

/// GET /api/faqs - List FAQs.
pub async fn list_faqs(
    State(state): State<AppState>,
    Query(params): Query<FaqQuery>,
) -> ApiResult<Vec<Faq>> {
    success(state.catalog.faqs(params.category.as_deref()))
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search query string.
    pub q: String,
}

/// GET /api/search - Search produce and farms.
pub async fn search_catalog(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResults> {
    let query = params.q.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Err(AppError::Validation(format!(
            "Search query must be at least {} characters",
            MIN_QUERY_LEN
        )));
    }

    success(state.catalog.search(query))
}
