use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::models::Post;

pub use filter::*;
pub use operations::*;
pub use pool::*;

pub mod filter;
#[cfg(test)]
pub mod memory;
pub mod operations;
pub mod pool;

/// Read access to published posts.
///
/// Every method only ever sees rows whose status is published; results are
/// ordered by id.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn count_published(&self, filters: &[PostFilter]) -> Result<i64, sqlx::Error>;

    async fn list_published(
        &self,
        filters: &[PostFilter],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>, sqlx::Error>;

    async fn get_published(&self, id: i32) -> Result<Option<Post>, sqlx::Error>;

    async fn ping(&self) -> Result<(), sqlx::Error>;
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect(&config.url)
        .await
        .context("Failed to connect to the database")?;

    // Test connection
    health_check(&pool)
        .await
        .context("Database did not answer the health check")?;

    Ok(pool)
}
