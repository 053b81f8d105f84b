//! Request parameter parsing and SQL construction for quote listings.

use std::num::{IntErrorKind, ParseIntError};

use sqlx::{QueryBuilder, Sqlite};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_MIN_LENGTH: i64 = 0;
pub const DEFAULT_MAX_LENGTH: i64 = 10_000;

const SELECT_QUOTES: &str = "SELECT id, quote, author, category FROM quotes";
const COUNT_QUOTES: &str = "SELECT COUNT(*) FROM quotes";

/// Leading integer of `raw`: optional whitespace and sign, then digits up to
/// the first non-digit, so `"12abc"` and `"5.7"` read as 12 and 5.
///
/// `None` when there are no digits. `Some(Err(_))` when the digits don't fit
/// in an `i64`.
pub fn integer_prefix(raw: &str) -> Option<Result<i64, ParseIntError>> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len() - sign_len);

    if digits == 0 {
        return None;
    }

    Some(trimmed[..sign_len + digits].parse())
}

/// Like [`integer_prefix`], clamping out-of-range values to the `i64` bounds.
fn saturating_prefix(raw: &str) -> Option<i64> {
    integer_prefix(raw).map(|parsed| {
        parsed.unwrap_or_else(|e| match e.kind() {
            IntErrorKind::NegOverflow => i64::MIN,
            _ => i64::MAX,
        })
    })
}

/// Parse a positive integer parameter. Missing, malformed and non-positive
/// values all yield `default`; values past `u32::MAX` are clamped.
pub fn positive_or(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(saturating_prefix)
        .filter(|value| *value > 0)
        .map(|value| u32::try_from(value).unwrap_or(u32::MAX))
        .unwrap_or(default)
}

/// Parse an integer parameter. Missing, malformed and zero values yield
/// `default`; negative values are kept.
pub fn nonzero_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(saturating_prefix)
        .filter(|value| *value != 0)
        .unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: positive_or(page, DEFAULT_PAGE),
            limit: positive_or(limit, DEFAULT_LIMIT),
        }
    }

    /// Rows to skip. Saturates instead of overflowing for absurd pages.
    pub fn offset(&self) -> i64 {
        let offset = u64::from(self.page.saturating_sub(1)) * u64::from(self.limit);
        i64::try_from(offset).unwrap_or(i64::MAX)
    }
}

/// Which rows of `quotes` a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteFilter {
    All,
    /// Case-insensitive substring match against the quote text. Holds the
    /// lower-cased needle.
    Text(String),
    /// Character length of the quote text within `[min, max]`.
    Length { min: i64, max: i64 },
    /// Case-insensitive substring match against the raw category string.
    /// `love` matches `"Love, Life"` as well as `"glove"`. Holds the
    /// lower-cased tag.
    Category(String),
}

impl QuoteFilter {
    pub fn length(min: Option<&str>, max: Option<&str>) -> Self {
        Self::Length {
            min: nonzero_or(min, DEFAULT_MIN_LENGTH),
            max: nonzero_or(max, DEFAULT_MAX_LENGTH),
        }
    }

    /// Search needles are lower-cased here since SQLite's `LOWER` only
    /// folds ASCII.
    pub fn text(q: &str) -> Self {
        Self::Text(q.to_lowercase())
    }

    pub fn category(tag: &str) -> Self {
        Self::Category(tag.to_lowercase())
    }

    fn randomized(&self) -> bool {
        matches!(self, Self::Length { .. } | Self::Category(_))
    }

    fn push_where(&self, builder: &mut QueryBuilder<'static, Sqlite>) {
        match self {
            Self::All => {}
            Self::Text(needle) => {
                builder
                    .push(" WHERE LOWER(quote) LIKE '%' || ")
                    .push_bind(needle.clone())
                    .push(" || '%'");
            }
            Self::Length { min, max } => {
                builder
                    .push(" WHERE LENGTH(quote) BETWEEN ")
                    .push_bind(*min)
                    .push(" AND ")
                    .push_bind(*max);
            }
            Self::Category(tag) => {
                builder
                    .push(" WHERE LOWER(category) LIKE '%' || ")
                    .push_bind(tag.clone())
                    .push(" || '%'");
            }
        }
    }

    /// The page of matching rows.
    pub fn select(&self, pagination: Pagination) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(SELECT_QUOTES);
        self.push_where(&mut builder);

        if self.randomized() {
            builder.push(" ORDER BY RANDOM()");
        }

        builder
            .push(" LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        builder
    }

    /// Count of every matching row, ignoring pagination.
    pub fn count(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(COUNT_QUOTES);
        self.push_where(&mut builder);

        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_prefix_reads_leading_digits() {
        assert_eq!(integer_prefix("42"), Some(Ok(42)));
        assert_eq!(integer_prefix("  12abc"), Some(Ok(12)));
        assert_eq!(integer_prefix("5.7"), Some(Ok(5)));
        assert_eq!(integer_prefix("-3x"), Some(Ok(-3)));
        assert_eq!(integer_prefix("+8"), Some(Ok(8)));
        assert_eq!(integer_prefix("abc"), None);
        assert_eq!(integer_prefix(""), None);
        assert_eq!(integer_prefix("-"), None);
        assert_eq!(integer_prefix("x12"), None);
        assert!(matches!(integer_prefix("99999999999999999999"), Some(Err(_))));
    }

    #[test]
    fn positive_params_fall_back_on_bad_input() {
        assert_eq!(positive_or(None, 10), 10);
        assert_eq!(positive_or(Some("25"), 10), 25);
        assert_eq!(positive_or(Some(" 3 "), 10), 3);
        assert_eq!(positive_or(Some("10abc"), 1), 10);
        assert_eq!(positive_or(Some("2.5"), 10), 2);
        assert_eq!(positive_or(Some("abc"), 10), 10);
        assert_eq!(positive_or(Some("0"), 10), 10);
        assert_eq!(positive_or(Some("-4"), 10), 10);
        assert_eq!(positive_or(Some(""), 1), 1);
        assert_eq!(positive_or(Some("99999999999999999999"), 10), u32::MAX);
    }

    #[test]
    fn nonzero_params_fall_back_on_bad_input_and_zero() {
        assert_eq!(nonzero_or(None, 10_000), 10_000);
        assert_eq!(nonzero_or(Some("150"), 10_000), 150);
        assert_eq!(nonzero_or(Some("50.5"), 0), 50);
        assert_eq!(nonzero_or(Some("-5"), 0), -5);
        assert_eq!(nonzero_or(Some("0"), 10_000), 10_000);
        assert_eq!(nonzero_or(Some("short"), 0), 0);
        assert_eq!(nonzero_or(Some("-99999999999999999999"), 0), i64::MIN);
    }

    #[test]
    fn pagination_offsets() {
        assert_eq!(Pagination::default().offset(), 0);
        assert_eq!(Pagination::from_params(Some("3"), Some("10")).offset(), 20);
        assert_eq!(Pagination::from_params(Some("1"), Some("50")).offset(), 0);
        assert_eq!(
            Pagination::from_params(Some("nope"), None),
            Pagination { page: 1, limit: 10 }
        );

        let huge = Pagination {
            page: u32::MAX,
            limit: u32::MAX,
        };
        assert_eq!(huge.offset(), i64::MAX);
    }

    #[test]
    fn length_filter_defaults() {
        assert_eq!(
            QuoteFilter::length(None, Some("x")),
            QuoteFilter::Length { min: 0, max: 10_000 }
        );
        assert_eq!(
            QuoteFilter::length(Some("50"), Some("150")),
            QuoteFilter::Length { min: 50, max: 150 }
        );
        assert_eq!(
            QuoteFilter::length(Some("0"), Some("0")),
            QuoteFilter::Length { min: 0, max: 10_000 }
        );
    }

    #[test]
    fn needles_are_lowercased_beyond_ascii() {
        assert_eq!(QuoteFilter::text("CAFÉ Love"), QuoteFilter::Text("café love".to_string()));
        assert_eq!(QuoteFilter::category("ÉTÉ"), QuoteFilter::Category("été".to_string()));
    }

    #[test]
    fn list_sql() {
        let filter = QuoteFilter::All;

        assert_eq!(
            filter.select(Pagination::default()).sql(),
            "SELECT id, quote, author, category FROM quotes LIMIT ? OFFSET ?"
        );
        assert_eq!(filter.count().sql(), "SELECT COUNT(*) FROM quotes");
    }

    #[test]
    fn search_sql_is_unordered() {
        let filter = QuoteFilter::Text("Love".to_string());

        assert_eq!(
            filter.select(Pagination::default()).sql(),
            "SELECT id, quote, author, category FROM quotes WHERE LOWER(quote) LIKE '%' || ? || '%' LIMIT ? OFFSET ?"
        );
        assert_eq!(
            filter.count().sql(),
            "SELECT COUNT(*) FROM quotes WHERE LOWER(quote) LIKE '%' || ? || '%'"
        );
    }

    #[test]
    fn length_and_category_sql_are_randomized() {
        let length = QuoteFilter::Length { min: 0, max: 100 };
        assert_eq!(
            length.select(Pagination::default()).sql(),
            "SELECT id, quote, author, category FROM quotes WHERE LENGTH(quote) BETWEEN ? AND ? ORDER BY RANDOM() LIMIT ? OFFSET ?"
        );

        let category = QuoteFilter::Category("love".to_string());
        assert_eq!(
            category.select(Pagination::default()).sql(),
            "SELECT id, quote, author, category FROM quotes WHERE LOWER(category) LIKE '%' || ? || '%' ORDER BY RANDOM() LIMIT ? OFFSET ?"
        );
        assert!(!category.count().sql().contains("RANDOM"));
    }
}
