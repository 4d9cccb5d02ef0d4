//! Cross-origin guard for the read-only resources.
//!
//! Every resource route runs behind [`cors_guard`]. The guard checks the
//! request method against the resource's allow-list before any handler runs,
//! answers `OPTIONS` preflight requests itself, and stamps the CORS headers on
//! whatever response leaves the resource.
//!
//! The header values are fixed:
//! - `Access-Control-Allow-Origin: *` and `Access-Control-Allow-Headers: Content-Type`
//!   on every response
//! - `Access-Control-Allow-Methods: GET` on preflight replies only
//! - `Allow: <METHOD,...>` on preflight and 405 replies

use std::str::FromStr;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const PREFLIGHT_ALLOW_METHODS: &str = "GET";

/// HTTP methods a resource can list in its allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    /// Lower-cased token, the form resources declare and the guard returns.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Head => "head",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
        }
    }

    /// Upper-cased token as it appears in the `Allow` header.
    pub fn as_header_token(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "head" => Ok(HttpMethod::Head),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "patch" => Ok(HttpMethod::Patch),
            "delete" => Ok(HttpMethod::Delete),
            "options" => Ok(HttpMethod::Options),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Outcome of [`method_check`].
#[derive(Debug)]
pub enum MethodCheck {
    /// The method is allowed; the handler should run.
    Proceed(HttpMethod),
    /// Terminal reply (preflight or 405) to send as-is.
    Reject(Response),
}

/// Joins the allow-list into the `Allow` header value.
///
/// Declaration order is kept and duplicates are not removed.
pub fn allow_header_value(allowed: &[HttpMethod]) -> String {
    allowed
        .iter()
        .map(HttpMethod::as_header_token)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decides whether a request may reach its handler.
pub fn method_check(method: &Method, allowed: &[HttpMethod]) -> MethodCheck {
    let allows = allow_header_value(allowed);
    let requested = method.as_str().parse::<HttpMethod>().ok();

    if requested == Some(HttpMethod::Options) {
        debug!(allow = %allows, "Answering preflight request");
        return MethodCheck::Reject(preflight_response(allows));
    }

    match requested {
        Some(method) if allowed.contains(&method) => MethodCheck::Proceed(method),
        _ => {
            debug!(method = %method, allow = %allows, "Rejecting disallowed method");
            MethodCheck::Reject(method_not_allowed_response(allows))
        }
    }
}

/// Stamps the CORS headers every response must carry.
pub fn finalize(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}

fn preflight_response(allows: String) -> Response {
    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref()),
            (header::ACCESS_CONTROL_ALLOW_METHODS, PREFLIGHT_ALLOW_METHODS),
            (header::ALLOW, allows.as_str()),
        ],
        allows.clone(),
    )
        .into_response();
    finalize(response)
}

fn method_not_allowed_response(allows: String) -> Response {
    let response = (
        StatusCode::METHOD_NOT_ALLOWED,
        [
            (header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref()),
            (header::ALLOW, allows.as_str()),
        ],
        allows.clone(),
    )
        .into_response();
    finalize(response)
}

/// Response mapper for routes outside any resource (health, 404 fallback).
pub async fn stamp_cors_headers(response: Response) -> Response {
    finalize(response)
}

/// Axum middleware running [`method_check`] ahead of the resource handler.
///
/// On `Proceed` the validated method is stored in the request extensions so
/// handlers can key their caches on it.
pub async fn cors_guard(
    State(allowed): State<&'static [HttpMethod]>,
    mut req: Request,
    next: Next,
) -> Response {
    match method_check(req.method(), allowed) {
        MethodCheck::Reject(response) => response,
        MethodCheck::Proceed(method) => {
            req.extensions_mut().insert(method);
            finalize(next.run(req).await)
        }
    }
}
