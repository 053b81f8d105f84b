use std::str::FromStr;

use futures::TryStreamExt;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    config::Config,
    models::quotes::{Quote, QuotePage, QuoteStats},
    query::{Pagination, QuoteFilter},
    stats::CategorySet,
};

/// Read-only handle over the `quotes` table.
#[derive(Clone, Debug)]
pub struct QuoteStore {
    pool: SqlitePool,
}

impl QuoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        tracing::info!("initializing database connection...");

        let opts = SqliteConnectOptions::from_str(&config.database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .create_if_missing(config.run_migrations);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(opts)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when connecting to the database"))?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("running migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("finished running migrations!");

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database connection closed.");
    }

    /// One page of quotes matching `filter`, plus the total match count.
    ///
    /// Both queries run concurrently; either failing fails the whole page.
    pub async fn page(&self, filter: &QuoteFilter, pagination: Pagination) -> sqlx::Result<QuotePage> {
        let mut select = filter.select(pagination);
        let mut count = filter.count();

        let (data, total) = tokio::try_join!(
            select.build_query_as::<Quote>().fetch_all(&self.pool),
            count.build_query_scalar::<i64>().fetch_one(&self.pool),
        )
        .inspect_err(|e| tracing::error!(err = ?e, filter = ?filter, "an error occurred when fetching quotes"))?;

        Ok(QuotePage {
            data,
            page: pagination.page,
            limit: pagination.limit,
            total,
        })
    }

    pub async fn random(&self) -> sqlx::Result<Option<Quote>> {
        sqlx::query_as::<_, Quote>(
            r#"
                SELECT id, quote, author, category
                FROM quotes
                ORDER BY RANDOM()
                LIMIT 1;
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when fetching a random quote"))
    }

    pub async fn by_id(&self, id: i64) -> sqlx::Result<Option<Quote>> {
        sqlx::query_as::<_, Quote>(
            r#"
                SELECT id, quote, author, category
                FROM quotes
                WHERE id = $1;
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, id, "an error occurred when fetching quote"))
    }

    /// Row count, distinct authors and distinct category tags.
    ///
    /// Categories are comma-packed per row, so every row's category is
    /// streamed through and split here. This visits the whole table.
    pub async fn stats(&self) -> sqlx::Result<QuoteStats> {
        let (total, authors) = tokio::try_join!(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotes;").fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT author) FROM quotes;")
                .fetch_one(&self.pool),
        )
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when counting quotes"))?;

        let mut rows = sqlx::query_scalar::<_, Option<String>>("SELECT category FROM quotes;")
            .fetch(&self.pool);
        let mut categories = CategorySet::default();

        while let Some(category) = rows
            .try_next()
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when reading categories"))?
        {
            categories.insert_raw(category.as_deref());
        }

        Ok(QuoteStats {
            total,
            authors,
            categories: categories.len(),
        })
    }
}
