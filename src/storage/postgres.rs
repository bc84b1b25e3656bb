//! PostgreSQL context store.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::StorageError;

use super::traits::{
    Blueprint, BlueprintProvider, ContextStore, PerformanceSnapshot, Product, QueryRecord,
    ScrapedPage,
};

/// PostgreSQL-backed [`ContextStore`].
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect using a database configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let url = config
            .resolve_url()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&url)
            .await
            .map_err(|e| StorageError::Connection(format!("PostgreSQL connection failed: {e}")))?;

        info!("Connected to PostgreSQL context store");
        let store = Self { pool };
        if config.migrate_on_start {
            store.migrate().await?;
        }
        Ok(store)
    }

    /// Create from an existing connection pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the schema migration.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        let migration_sql = include_str!("../../migrations/001_create_context_tables.sql");

        sqlx::raw_sql(migration_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Migration(format!("Migration failed: {e}")))?;

        info!("Context schema migration complete");
        Ok(())
    }

    fn blueprint_from_row(row: &PgRow) -> Result<Blueprint, StorageError> {
        Ok(Blueprint {
            id: row.try_get("id").map_err(query_err)?,
            product_id: row.try_get("product_id").map_err(query_err)?,
            title: row.try_get("title").map_err(query_err)?,
            content: row.try_get("content").map_err(query_err)?,
            created_at: row.try_get("created_at").map_err(query_err)?,
        })
    }
}

fn query_err(e: sqlx::Error) -> StorageError {
    StorageError::Query(e.to_string())
}

#[async_trait]
impl ContextStore for PostgresStore {
    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, StorageError> {
        let row = sqlx::query(
            "SELECT id, name, url, user_id, created_at FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_err)?;

        row.map(|row| {
            Ok(Product {
                id: row.try_get("id").map_err(query_err)?,
                name: row.try_get("name").map_err(query_err)?,
                url: row.try_get("url").map_err(query_err)?,
                user_id: row.try_get("user_id").map_err(query_err)?,
                created_at: row.try_get("created_at").map_err(query_err)?,
            })
        })
        .transpose()
    }

    async fn latest_snapshot(
        &self,
        product_id: &str,
    ) -> Result<Option<PerformanceSnapshot>, StorageError> {
        let row = sqlx::query(
            "SELECT id, product_id, visibility_score, total_queries, mentions, avg_position, \
             summary, created_at \
             FROM performance_snapshots WHERE product_id = $1 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_err)?;

        row.map(|row| {
            Ok(PerformanceSnapshot {
                id: row.try_get("id").map_err(query_err)?,
                product_id: row.try_get("product_id").map_err(query_err)?,
                visibility_score: row.try_get("visibility_score").map_err(query_err)?,
                total_queries: row.try_get("total_queries").map_err(query_err)?,
                mentions: row.try_get("mentions").map_err(query_err)?,
                avg_position: row.try_get("avg_position").map_err(query_err)?,
                summary: row.try_get("summary").map_err(query_err)?,
                created_at: row.try_get("created_at").map_err(query_err)?,
            })
        })
        .transpose()
    }

    async fn query_records(
        &self,
        product_id: &str,
        filter: Option<&str>,
        limit: u32,
    ) -> Result<Vec<QueryRecord>, StorageError> {
        let rows = match filter {
            Some(filter) => {
                sqlx::query(
                    "SELECT id, product_id, query_text, engine, mentioned, position, \
                     response_snippet, created_at \
                     FROM query_results \
                     WHERE product_id = $1 AND query_text ILIKE '%' || $2 || '%' \
                     ORDER BY created_at DESC LIMIT $3",
                )
                .bind(product_id)
                .bind(filter)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, product_id, query_text, engine, mentioned, position, \
                     response_snippet, created_at \
                     FROM query_results WHERE product_id = $1 \
                     ORDER BY created_at DESC LIMIT $2",
                )
                .bind(product_id)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(query_err)?;

        rows.iter()
            .map(|row| {
                Ok(QueryRecord {
                    id: row.try_get("id").map_err(query_err)?,
                    product_id: row.try_get("product_id").map_err(query_err)?,
                    query_text: row.try_get("query_text").map_err(query_err)?,
                    engine: row.try_get("engine").map_err(query_err)?,
                    mentioned: row.try_get("mentioned").map_err(query_err)?,
                    position: row.try_get("position").map_err(query_err)?,
                    response_snippet: row.try_get("response_snippet").map_err(query_err)?,
                    created_at: row.try_get("created_at").map_err(query_err)?,
                })
            })
            .collect()
    }

    async fn latest_blueprint(
        &self,
        product_id: &str,
        provider: BlueprintProvider,
    ) -> Result<Option<Blueprint>, StorageError> {
        // Table names come from a closed enum, not user input.
        let sql = format!(
            "SELECT id, product_id, title, content, created_at FROM {} \
             WHERE product_id = $1 ORDER BY created_at DESC LIMIT 1",
            provider.table()
        );

        let row = sqlx::query(&sql)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err)?;

        row.map(|row| Self::blueprint_from_row(&row)).transpose()
    }

    async fn latest_scraped_page(
        &self,
        product_id: &str,
    ) -> Result<Option<ScrapedPage>, StorageError> {
        let row = sqlx::query(
            "SELECT id, product_id, url, content, created_at FROM scraped_pages \
             WHERE product_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_err)?;

        row.map(|row| {
            Ok(ScrapedPage {
                id: row.try_get("id").map_err(query_err)?,
                product_id: row.try_get("product_id").map_err(query_err)?,
                url: row.try_get("url").map_err(query_err)?,
                content: row.try_get("content").map_err(query_err)?,
                created_at: row.try_get("created_at").map_err(query_err)?,
            })
        })
        .transpose()
    }
}
