use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::Config;
use crate::db::PostStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub config: Config,
}

/// Status value of a draft post.
pub const CONTENT_STATUS_DRAFT: i32 = 1;
/// Status value of a published post. Only these rows are ever served.
pub const CONTENT_STATUS_PUBLISHED: i32 = 2;

// Read-only view over the blog post table.
// Note: FromRow is used with runtime query_as (no DATABASE_URL at compile time)

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i32,
    pub slug: Option<String>,
    pub title: String,
    pub content: String,
    pub description: String,
    pub keywords_string: String,
    pub status: i32,
}

/// A column a resource may expose or filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    Id,
    Slug,
    Title,
    Content,
    Description,
    KeywordsString,
}

impl PostField {
    pub const ALL: [PostField; 6] = [
        PostField::Id,
        PostField::Slug,
        PostField::Title,
        PostField::Content,
        PostField::Description,
        PostField::KeywordsString,
    ];

    /// Serialized name, also the column name.
    pub fn name(&self) -> &'static str {
        match self {
            PostField::Id => "id",
            PostField::Slug => "slug",
            PostField::Title => "title",
            PostField::Content => "content",
            PostField::Description => "description",
            PostField::KeywordsString => "keywords_string",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, PostField::Id)
    }
}

impl std::fmt::Display for PostField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == CONTENT_STATUS_PUBLISHED
    }

    pub fn value_of(&self, field: PostField) -> Value {
        match field {
            PostField::Id => Value::from(self.id),
            PostField::Slug => self
                .slug
                .as_ref()
                .map_or(Value::Null, |slug| Value::from(slug.as_str())),
            PostField::Title => Value::from(self.title.as_str()),
            PostField::Content => Value::from(self.content.as_str()),
            PostField::Description => Value::from(self.description.as_str()),
            PostField::KeywordsString => Value::from(self.keywords_string.as_str()),
        }
    }

    /// Projects the post onto `fields`, adding its `resource_uri`.
    pub fn project(&self, fields: &[PostField], resource_uri: String) -> Value {
        let mut object: Map<String, Value> = fields
            .iter()
            .map(|field| (field.name().to_string(), self.value_of(*field)))
            .collect();
        object.insert("resource_uri".to_string(), Value::String(resource_uri));
        Value::Object(object)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
}
