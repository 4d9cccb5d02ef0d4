// Middleware for method gating and CORS headers

pub mod cors;

pub use cors::*;
