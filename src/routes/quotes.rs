//! `/quotes` endpoints.
//!
//! Query parameters are taken as raw strings and parsed with fallbacks, so a
//! malformed or repeated `page` or `max` never turns into a 400.

use axum::extract::{Path, Query, State};
use axum::http::Uri;
use serde::Deserialize;

use super::{cached_json, CachedJson};
use crate::{
    cache::ttl,
    error::{ApiError, Operation},
    models::quotes::{Quote, QuotePage, QuoteStats},
    query::{integer_prefix, Pagination, QuoteFilter},
    state::AppState,
};

/// Raw query-string pairs in request order.
///
/// Repeated keys are kept rather than rejected; lookups take the first value.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct Params(Vec<(String, String)>);

impl Params {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn pagination(&self) -> Pagination {
        Pagination::from_params(self.get("page"), self.get("limit"))
    }
}

async fn paged(
    state: &AppState,
    uri: &Uri,
    ttl: std::time::Duration,
    operation: Operation,
    filter: QuoteFilter,
    pagination: Pagination,
) -> Result<CachedJson<QuotePage>, ApiError> {
    let page = state
        .cached(&uri.to_string(), ttl, || async {
            state
                .store
                .page(&filter, pagination)
                .await
                .map_err(ApiError::store(operation))
        })
        .await?;

    Ok(cached_json(ttl, page))
}

/// `GET /quotes?page=&limit=`
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<Params>,
) -> Result<CachedJson<QuotePage>, ApiError> {
    paged(
        &state,
        &uri,
        ttl::LIST,
        Operation::ListQuotes,
        QuoteFilter::All,
        params.pagination(),
    )
    .await
}

/// `GET /quotes/random`
#[tracing::instrument(skip(state))]
pub async fn random(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<CachedJson<Quote>, ApiError> {
    let quote = state
        .cached(&uri.to_string(), ttl::RANDOM, || async {
            state
                .store
                .random()
                .await
                .map_err(ApiError::store(Operation::RandomQuote))?
                .ok_or_else(|| ApiError::not_found(Operation::RandomQuote, "No quotes found"))
        })
        .await?;

    Ok(cached_json(ttl::RANDOM, quote))
}

/// `GET /quotes/search?q=&page=&limit=`
#[tracing::instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<Params>,
) -> Result<CachedJson<QuotePage>, ApiError> {
    let q = params
        .get("q")
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request(Operation::SearchQuotes, "Missing query"))?;

    paged(
        &state,
        &uri,
        ttl::SEARCH,
        Operation::SearchQuotes,
        QuoteFilter::text(q),
        params.pagination(),
    )
    .await
}

/// `GET /quotes/length?min=&max=&page=&limit=`
#[tracing::instrument(skip(state))]
pub async fn by_length(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<Params>,
) -> Result<CachedJson<QuotePage>, ApiError> {
    let filter = QuoteFilter::length(params.get("min"), params.get("max"));

    paged(
        &state,
        &uri,
        ttl::LENGTH,
        Operation::FilterByLength,
        filter,
        params.pagination(),
    )
    .await
}

/// `GET /quotes/category/{tag}?page=&limit=`
#[tracing::instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    uri: Uri,
    Path(tag): Path<String>,
    Query(params): Query<Params>,
) -> Result<CachedJson<QuotePage>, ApiError> {
    paged(
        &state,
        &uri,
        ttl::CATEGORY,
        Operation::FilterByCategory,
        QuoteFilter::category(&tag),
        params.pagination(),
    )
    .await
}

/// `GET /quotes/stats`
#[tracing::instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<CachedJson<QuoteStats>, ApiError> {
    let stats = state
        .cached(&uri.to_string(), ttl::STATS, || async {
            state
                .store
                .stats()
                .await
                .map_err(ApiError::store(Operation::Stats))
        })
        .await?;

    Ok(cached_json(ttl::STATS, stats))
}

/// `GET /quotes/{id}`
///
/// The id is the leading integer of the segment, so `12abc` reads as 12. A
/// segment with no leading digits is rejected before the cache or the
/// database is touched; one too large for any row is a 404.
#[tracing::instrument(skip(state))]
pub async fn by_id(
    State(state): State<AppState>,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<CachedJson<Quote>, ApiError> {
    let id = integer_prefix(&id)
        .ok_or_else(|| ApiError::bad_request(Operation::QuoteById, "Invalid quote ID"))?
        .map_err(|_| ApiError::not_found(Operation::QuoteById, "Quote not found"))?;

    let quote = state
        .cached(&uri.to_string(), ttl::BY_ID, || async {
            state
                .store
                .by_id(id)
                .await
                .map_err(ApiError::store(Operation::QuoteById))?
                .ok_or_else(|| ApiError::not_found(Operation::QuoteById, "Quote not found"))
        })
        .await?;

    Ok(cached_json(ttl::BY_ID, quote))
}
