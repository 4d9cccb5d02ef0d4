use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{Comparison, Condition, PostFilter, PostStore, Scalar};
use crate::models::{Post, PostField};

/// In-memory post store evaluating filters the way the SQL does.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: Vec<Post>,
    queries: AtomicUsize,
}

impl MemoryPostStore {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of list/detail queries served so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn published<'a>(&'a self, filters: &'a [PostFilter]) -> impl Iterator<Item = &'a Post> + 'a {
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|post| post.is_published())
            .filter(|post| filters.iter().all(|f| f.matches(post)))
            .collect();
        posts.sort_by_key(|post| post.id);
        posts.into_iter()
    }
}

fn text_of(post: &Post, field: PostField) -> Option<String> {
    match field {
        PostField::Id => Some(post.id.to_string()),
        PostField::Slug => post.slug.clone(),
        PostField::Title => Some(post.title.clone()),
        PostField::Content => Some(post.content.clone()),
        PostField::Description => Some(post.description.clone()),
        PostField::KeywordsString => Some(post.keywords_string.clone()),
    }
}

fn compare(post: &Post, field: PostField, op: Comparison, value: &Scalar) -> bool {
    let Some(text) = text_of(post, field) else {
        return false;
    };
    let ordering = match (field, value) {
        (PostField::Id, Scalar::Integer(i)) => post.id.cmp(i),
        _ => text.as_str().cmp(value.as_text().as_str()),
    };
    let needle = value.as_text();
    let (text, needle) = if op.is_case_insensitive() {
        (text.to_uppercase(), needle.to_uppercase())
    } else {
        (text, needle)
    };

    match op {
        Comparison::Exact => ordering.is_eq(),
        Comparison::IExact => text == needle,
        Comparison::Contains | Comparison::IContains => text.contains(&needle),
        Comparison::StartsWith | Comparison::IStartsWith => text.starts_with(&needle),
        Comparison::EndsWith | Comparison::IEndsWith => text.ends_with(&needle),
        Comparison::Gt => ordering.is_gt(),
        Comparison::Gte => ordering.is_ge(),
        Comparison::Lt => ordering.is_lt(),
        Comparison::Lte => ordering.is_le(),
    }
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match &self.condition {
            Condition::Compare(op, value) => compare(post, self.field, *op, value),
            Condition::In(values) => values
                .iter()
                .any(|value| compare(post, self.field, Comparison::Exact, value)),
            Condition::IsNull(is_null) => text_of(post, self.field).is_none() == *is_null,
        }
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn count_published(&self, filters: &[PostFilter]) -> Result<i64, sqlx::Error> {
        Ok(self.published(filters).count() as i64)
    }

    async fn list_published(
        &self,
        filters: &[PostFilter],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>, sqlx::Error> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.published(filters).skip(offset).take(limit).cloned().collect())
    }

    async fn get_published(&self, id: i32) -> Result<Option<Post>, sqlx::Error> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.published(&[]).find(|post| post.id == id).cloned())
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Post, CONTENT_STATUS_DRAFT, CONTENT_STATUS_PUBLISHED};

    pub fn post(id: i32, slug: Option<&str>, title: &str, status: i32) -> Post {
        Post {
            id,
            slug: slug.map(str::to_string),
            title: title.to_string(),
            content: format!("<p>{title} body</p>"),
            description: format!("About {title}"),
            keywords_string: "rust web".to_string(),
            status,
        }
    }

    /// Four published posts (ids 1, 2, 4, 5) and one draft (id 3).
    pub fn sample_posts() -> Vec<Post> {
        vec![
            post(5, Some("async-rust"), "Async Rust", CONTENT_STATUS_PUBLISHED),
            post(1, Some("hello-world"), "Hello World", CONTENT_STATUS_PUBLISHED),
            post(2, Some("rust-tips"), "Rust Tips", CONTENT_STATUS_PUBLISHED),
            post(3, Some("secret-draft"), "Secret Draft", CONTENT_STATUS_DRAFT),
            post(4, None, "Untitled 100%", CONTENT_STATUS_PUBLISHED),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_posts;
    use super::*;

    fn filter(field: PostField, condition: Condition) -> Vec<PostFilter> {
        vec![PostFilter { field, condition }]
    }

    #[tokio::test]
    async fn test_drafts_are_hidden() {
        let store = MemoryPostStore::new(sample_posts());

        assert_eq!(store.count_published(&[]).await.unwrap(), 4);
        let ids: Vec<i32> = store
            .list_published(&[], 10, 0)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
        assert!(store.get_published(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filters() {
        let store = MemoryPostStore::new(sample_posts());

        let hits = store
            .count_published(&filter(
                PostField::Title,
                Condition::Compare(Comparison::IContains, Scalar::Text("RUST".into())),
            ))
            .await
            .unwrap();
        assert_eq!(hits, 2);

        let hits = store
            .count_published(&filter(PostField::Slug, Condition::IsNull(true)))
            .await
            .unwrap();
        assert_eq!(hits, 1);

        let hits = store
            .count_published(&filter(
                PostField::Slug,
                Condition::In(vec![Scalar::Text("rust-tips".into()), Scalar::Text("secret-draft".into())]),
            ))
            .await
            .unwrap();
        assert_eq!(hits, 1);
    }

    #[tokio::test]
    async fn test_paging_window() {
        let store = MemoryPostStore::new(sample_posts());
        let page = store.list_published(&[], 2, 1).await.unwrap();
        let ids: Vec<i32> = page.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }
}
