//! API error types and response formatting.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// The route an error came from, used for logging and for the generic
/// message returned when the data store fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListQuotes,
    RandomQuote,
    SearchQuotes,
    FilterByLength,
    FilterByCategory,
    Stats,
    QuoteById,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListQuotes => "list_quotes",
            Self::RandomQuote => "random_quote",
            Self::SearchQuotes => "search_quotes",
            Self::FilterByLength => "filter_by_length",
            Self::FilterByCategory => "filter_by_category",
            Self::Stats => "stats",
            Self::QuoteById => "quote_by_id",
        }
    }

    /// Message sent to the client when the store fails. Never includes
    /// the underlying error.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::ListQuotes => "Failed to fetch quotes",
            Self::RandomQuote => "Failed to fetch random quote",
            Self::SearchQuotes => "Failed to search quotes",
            Self::FilterByLength => "Failed to filter quotes by length",
            Self::FilterByCategory => "Failed to fetch quotes by category",
            Self::Stats => "Failed to calculate stats",
            Self::QuoteById => "Failed to fetch quote",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed required input.
    #[error("{operation}: bad request: {message}")]
    BadRequest {
        operation: Operation,
        message: &'static str,
    },

    #[error("{operation}: not found: {message}")]
    NotFound {
        operation: Operation,
        message: &'static str,
    },

    /// Any failure while querying the data store.
    #[error("{operation}: store error: {source}")]
    Store {
        operation: Operation,
        #[source]
        source: sqlx::Error,
    },
}

impl ApiError {
    pub fn bad_request(operation: Operation, message: &'static str) -> Self {
        Self::BadRequest { operation, message }
    }

    pub fn not_found(operation: Operation, message: &'static str) -> Self {
        Self::NotFound { operation, message }
    }

    /// Adapter for `map_err` on store calls.
    pub fn store(operation: Operation) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Store { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match &self {
            Self::BadRequest { operation, message } => {
                tracing::warn!(operation = %operation, "{message}");
                *message
            }
            Self::NotFound { operation, message } => {
                tracing::info!(operation = %operation, "{message}");
                *message
            }
            Self::Store { operation, source } => {
                tracing::error!(operation = %operation, err = ?source, "an error occurred when querying the database");
                operation.failure_message()
            }
        };

        (self.status(), Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let (status, body) =
            render(ApiError::bad_request(Operation::SearchQuotes, "Missing query")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing query" }));

        let (status, body) =
            render(ApiError::not_found(Operation::QuoteById, "Quote not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Quote not found" }));
    }

    #[tokio::test]
    async fn store_errors_hide_internal_detail() {
        let err = ApiError::store(Operation::Stats)(sqlx::Error::Protocol(
            "secret connection detail".to_string(),
        ));
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to calculate stats" }));
    }
}
