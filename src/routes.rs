//! API route definitions.

mod quotes;
mod status;

use std::time::Duration;

use axum::http::{header, HeaderName};
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

/// JSON body plus a `Cache-Control` header matching the route's cache TTL.
pub type CachedJson<T> = ([(HeaderName, String); 1], Json<T>);

fn cached_json<T>(ttl: Duration, value: T) -> CachedJson<T> {
    (
        [(
            header::CACHE_CONTROL,
            format!("public, max-age={}", ttl.as_secs()),
        )],
        Json(value),
    )
}

/// Build the complete API router.
///
/// - `GET /` - Welcome text
/// - `GET /health` - Version and uptime
/// - `GET /quotes` - Paginated listing
/// - `GET /quotes/random` - One random quote
/// - `GET /quotes/search` - Case-insensitive text search
/// - `GET /quotes/length` - Filter by character length
/// - `GET /quotes/category/{tag}` - Filter by category substring
/// - `GET /quotes/stats` - Totals for quotes, authors and categories
/// - `GET /quotes/{id}` - One quote by id
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status::welcome))
        .route("/health", get(status::health))
        .route("/quotes", get(quotes::list))
        .route("/quotes/random", get(quotes::random))
        .route("/quotes/search", get(quotes::search))
        .route("/quotes/length", get(quotes::by_length))
        .route("/quotes/category/{tag}", get(quotes::by_category))
        .route("/quotes/stats", get(quotes::stats))
        .route("/quotes/{id}", get(quotes::by_id))
        .with_state(state)
}
