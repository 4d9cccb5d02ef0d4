//! HTTP routes
//!
//! - `/app/`, `/app/{id}/` - slug index of published posts
//! - `/blog/`, `/blog/{id}/` - full published posts
//! - `/health` - liveness and database check
//!
//! Anything else answers 404. Every response, including the 404, carries the
//! CORS headers.

pub mod health;

use axum::{http::StatusCode, middleware, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::stamp_cors_headers;
use crate::models::AppState;
use crate::resources::{ListResource, RESOURCES};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let resources = RESOURCES.into_iter().fold(Router::new(), |router, declaration| {
        info!(resource = declaration.name, "Mounting resource");
        router.merge(ListResource::new(declaration, state.store.clone(), state.config.api.clone()).router())
    });

    // Routes outside the resources have no guard; stamp their headers here
    let site = Router::new()
        .merge(health::router(state))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::map_response(stamp_cors_headers));

    Router::new()
        .merge(resources)
        .merge(site)
        .layer(TraceLayer::new_for_http())
}
