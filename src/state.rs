use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    cache::{self, ResponseCache},
    error::ApiError,
    store::QuoteStore,
};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: QuoteStore,
    /// `None` when response caching is disabled.
    pub cache: Option<ResponseCache>,
}

impl AppState {
    pub fn new(store: QuoteStore, cache: Option<ResponseCache>) -> Self {
        Self { store, cache }
    }

    pub async fn cached<T, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        cache::get_or_compute(self.cache.as_ref(), key, ttl, compute).await
    }
}
