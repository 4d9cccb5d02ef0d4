//! Read-only post resources.
//!
//! A [`ResourceDeclaration`] binds the published-post source to a field
//! projection, an allowed-method list, a cache TTL and the fields it may be
//! filtered on. [`ListResource`] serves a declaration:
//! - `/<name>/` - paginated, filterable list
//! - `/<name>/{id}/` - single post
//!
//! Both routes sit behind [`cors_guard`], so only the allow-listed methods
//! ever reach the handlers below.

pub mod cache;
pub mod filters;
pub mod paginator;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Extension, Router,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::db::PostStore;
use crate::middleware::{cors_guard, HttpMethod};
use crate::models::{Post, PostField};
use crate::types::{ApiError, ApiResult};

pub use cache::ResponseCache;
pub use filters::build_filters;
pub use paginator::{Page, PageMeta};

/// Static configuration of one resource.
#[derive(Debug)]
pub struct ResourceDeclaration {
    pub name: &'static str,
    pub fields: &'static [PostField],
    pub allowed_methods: &'static [HttpMethod],
    pub cache_ttl: Duration,
    /// Fields accepting every lookup.
    pub filtering: &'static [PostField],
}

/// Slug index used by the front-end router.
pub static APP_RESOURCE: ResourceDeclaration = ResourceDeclaration {
    name: "app",
    fields: &[PostField::KeywordsString, PostField::Slug, PostField::Title, PostField::Id],
    allowed_methods: &[HttpMethod::Get],
    cache_ttl: Duration::from_secs(100),
    filtering: &[PostField::Slug, PostField::Title],
};

/// Full post bodies.
pub static BLOG_RESOURCE: ResourceDeclaration = ResourceDeclaration {
    name: "blog",
    fields: &[
        PostField::KeywordsString,
        PostField::Slug,
        PostField::Title,
        PostField::Content,
        PostField::Description,
        PostField::Id,
    ],
    allowed_methods: &[HttpMethod::Get],
    cache_ttl: Duration::from_secs(10),
    filtering: &[],
};

pub static RESOURCES: [&ResourceDeclaration; 2] = [&APP_RESOURCE, &BLOG_RESOURCE];

/// Body of a list view.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub meta: PageMeta,
    pub objects: Vec<Value>,
}

/// A declaration wired to a store and its own response cache.
#[derive(Clone)]
pub struct ListResource {
    declaration: &'static ResourceDeclaration,
    store: Arc<dyn PostStore>,
    cache: ResponseCache,
    api: ApiConfig,
}

impl ListResource {
    pub fn new(declaration: &'static ResourceDeclaration, store: Arc<dyn PostStore>, api: ApiConfig) -> Self {
        Self {
            declaration,
            store,
            cache: ResponseCache::new(declaration.cache_ttl),
            api,
        }
    }

    pub fn name(&self) -> &'static str {
        self.declaration.name
    }

    pub fn list_uri(&self) -> String {
        format!("/{}/", self.name())
    }

    pub fn detail_uri(&self, id: i32) -> String {
        format!("/{}/{}/", self.name(), id)
    }

    fn project(&self, post: &Post) -> Value {
        post.project(self.declaration.fields, self.detail_uri(post.id))
    }

    fn json_response(&self, body: Bytes) -> Response {
        let cache_control = self.cache.cache_control();
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref()),
                (header::CACHE_CONTROL, cache_control.as_str()),
                (header::VARY, "Accept"),
            ],
            body,
        )
            .into_response()
    }

    /// Routes for this resource, guarded by its allow-list.
    pub fn router(self) -> Router {
        let list_path = self.list_uri();
        let detail_path = format!("/{}/{{id}}/", self.name());

        Router::new()
            .route(&list_path, any(get_list))
            .route(&detail_path, any(get_detail))
            .route_layer(middleware::from_fn_with_state(
                self.declaration.allowed_methods,
                cors_guard,
            ))
            .with_state(self)
    }
}

fn parse_query(query: Option<&str>) -> ApiResult<Vec<(String, String)>> {
    serde_urlencoded::from_str(query.unwrap_or_default())
        .map_err(|e| ApiError::bad_request(format!("Invalid query string: {e}")))
}

async fn get_list(
    State(resource): State<ListResource>,
    Extension(method): Extension<HttpMethod>,
    RawQuery(query): RawQuery,
) -> ApiResult<Response> {
    let params = parse_query(query.as_deref())?;
    let key = ResponseCache::key(resource.name(), "list", method, &params);

    if let Some(body) = resource.cache.get(&key).await {
        debug!(resource = resource.name(), key = %key, "Serving list from cache");
        return Ok(resource.json_response(body));
    }

    let filters = build_filters(resource.declaration, &params)?;
    let page = Page::from_params(&params, &resource.api)?;

    let total = resource.store.count_published(&filters).await?;
    let posts = resource
        .store
        .list_published(&filters, page.limit, page.offset)
        .await?;

    let response = ListResponse {
        meta: page.meta(usize::try_from(total).unwrap_or_default(), &resource.list_uri(), &params),
        objects: posts.iter().map(|post| resource.project(post)).collect(),
    };
    let body = Bytes::from(serde_json::to_vec(&response)?);

    debug!(
        resource = resource.name(),
        total,
        returned = response.objects.len(),
        "Rendered list"
    );
    resource.cache.insert(key, body.clone()).await;
    Ok(resource.json_response(body))
}

async fn get_detail(
    State(resource): State<ListResource>,
    Extension(method): Extension<HttpMethod>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: i32 = id.parse().map_err(|_| {
        ApiError::bad_request("Invalid resource lookup data provided (mismatched type).")
    })?;
    let key = ResponseCache::key(resource.name(), &format!("detail:{id}"), method, &[]);

    if let Some(body) = resource.cache.get(&key).await {
        debug!(resource = resource.name(), id, "Serving detail from cache");
        return Ok(resource.json_response(body));
    }

    let post = resource
        .store
        .get_published(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let body = Bytes::from(serde_json::to_vec(&resource.project(&post))?);

    resource.cache.insert(key, body.clone()).await;
    Ok(resource.json_response(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations() {
        assert_eq!(APP_RESOURCE.name, "app");
        assert_eq!(APP_RESOURCE.cache_ttl, Duration::from_secs(100));
        assert_eq!(BLOG_RESOURCE.name, "blog");
        assert_eq!(BLOG_RESOURCE.cache_ttl, Duration::from_secs(10));

        for resource in RESOURCES {
            assert_eq!(resource.allowed_methods, &[HttpMethod::Get]);
            assert!(resource
                .filtering
                .iter()
                .all(|field| resource.fields.contains(field)));
        }
    }

    #[test]
    fn test_blog_projects_superset_of_app() {
        assert!(APP_RESOURCE
            .fields
            .iter()
            .all(|field| BLOG_RESOURCE.fields.contains(field)));
        assert!(!APP_RESOURCE.fields.contains(&PostField::Content));
        assert!(BLOG_RESOURCE.fields.contains(&PostField::Description));
    }

    #[test]
    fn test_parse_query() {
        assert!(parse_query(None).unwrap().is_empty());
        assert_eq!(
            parse_query(Some("slug=a%20b&limit=2")).unwrap(),
            vec![
                ("slug".to_string(), "a b".to_string()),
                ("limit".to_string(), "2".to_string())
            ]
        );
    }
}
