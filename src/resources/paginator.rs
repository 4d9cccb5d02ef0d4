//! `limit`/`offset` paging for list views.

use serde::Serialize;

use crate::config::ApiConfig;
use crate::types::{ApiError, ApiResult};

/// The window of a list view a request asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

/// `meta` block of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub limit: usize,
    pub offset: usize,
    pub total_count: usize,
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// Last value of `key`, matching how repeated query parameters resolve.
fn last_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

impl Page {
    pub fn from_params(params: &[(String, String)], config: &ApiConfig) -> ApiResult<Self> {
        Ok(Self {
            limit: Self::limit(params, config)?,
            offset: Self::offset(params)?,
        })
    }

    fn limit(params: &[(String, String)], config: &ApiConfig) -> ApiResult<usize> {
        let limit = match last_param(params, "limit") {
            None => config.limit_per_page as i64,
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                ApiError::bad_request(format!(
                    "Invalid limit '{raw}' provided. Please provide a positive integer."
                ))
            })?,
        };
        if limit < 0 {
            return Err(ApiError::bad_request(format!(
                "Invalid limit '{limit}' provided. Please provide a positive integer >= 0."
            )));
        }

        let limit = limit as usize;
        if config.max_limit > 0 && (limit == 0 || limit > config.max_limit) {
            return Ok(config.max_limit);
        }
        Ok(limit)
    }

    fn offset(params: &[(String, String)]) -> ApiResult<usize> {
        let Some(raw) = last_param(params, "offset") else {
            return Ok(0);
        };
        let offset = raw.parse::<i64>().map_err(|_| {
            ApiError::bad_request(format!("Invalid offset '{raw}' provided. Please provide an integer."))
        })?;
        if offset < 0 {
            return Err(ApiError::bad_request(format!(
                "Invalid offset '{offset}' provided. Please provide a positive integer >= 0."
            )));
        }
        Ok(offset as usize)
    }

    /// Builds the `meta` block, linking neighbouring pages under `list_uri`.
    pub fn meta(&self, total_count: usize, list_uri: &str, params: &[(String, String)]) -> PageMeta {
        let (previous, next) = if self.limit == 0 {
            (None, None)
        } else {
            let previous = self
                .offset
                .checked_sub(self.limit)
                .and_then(|offset| page_uri(list_uri, params, self.limit, offset));
            let next = if self.offset + self.limit >= total_count {
                None
            } else {
                page_uri(list_uri, params, self.limit, self.offset + self.limit)
            };
            (previous, next)
        };

        PageMeta {
            limit: self.limit,
            offset: self.offset,
            total_count,
            previous,
            next,
        }
    }
}

fn page_uri(list_uri: &str, params: &[(String, String)], limit: usize, offset: usize) -> Option<String> {
    let limit = limit.to_string();
    let offset = offset.to_string();
    let mut query: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, _)| k != "limit" && k != "offset")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    query.push(("limit", &limit));
    query.push(("offset", &offset));

    serde_urlencoded::to_string(&query)
        .ok()
        .map(|query| format!("{list_uri}?{query}"))
}
