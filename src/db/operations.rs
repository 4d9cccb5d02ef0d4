use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::{health_check, PostFilter, PostStore};
use crate::models::{Post, CONTENT_STATUS_PUBLISHED};

/// Table holding the blog posts.
pub const POSTS_TABLE: &str = "blog_blogpost";

const POST_COLUMNS: &str = "id, slug, title, content, description, keywords_string, status";

/// Postgres-backed post store.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn published_query<'a>(select: &str, filters: &[PostFilter]) -> QueryBuilder<'a, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {select} FROM {POSTS_TABLE} WHERE status = "));
        qb.push_bind(CONTENT_STATUS_PUBLISHED);
        for filter in filters {
            filter.push_sql(&mut qb);
        }
        qb
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn count_published(&self, filters: &[PostFilter]) -> Result<i64, sqlx::Error> {
        let mut qb = Self::published_query("COUNT(*)", filters);
        debug!(sql = qb.sql(), "Counting published posts");
        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }

    async fn list_published(
        &self,
        filters: &[PostFilter],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let mut qb = Self::published_query(POST_COLUMNS, filters);
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);
        debug!(sql = qb.sql(), "Listing published posts");
        qb.build_query_as::<Post>().fetch_all(&self.pool).await
    }

    async fn get_published(&self, id: i32) -> Result<Option<Post>, sqlx::Error> {
        let sql = format!("SELECT {POST_COLUMNS} FROM {POSTS_TABLE} WHERE id = $1 AND status = $2");
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(CONTENT_STATUS_PUBLISHED)
            .fetch_optional(&self.pool)
            .await
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        health_check(&self.pool).await
    }
}
