// Blog API - read-only, CORS-enabled JSON resources over published blog posts

pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod resources;
pub mod routes;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
