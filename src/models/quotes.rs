use serde::{Deserialize, Serialize};

/// A row of the `quotes` table.
///
/// `category` is a free-form, comma-separated tag list and may be NULL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quote {
    pub id: i64,
    pub quote: String,
    pub author: String,
    pub category: Option<String>,
}

/// One page of a filtered quote listing.
///
/// `total` counts every matching row, not just the ones in `data`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePage {
    pub data: Vec<Quote>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteStats {
    pub total: i64,
    pub authors: i64,
    pub categories: usize,
}
