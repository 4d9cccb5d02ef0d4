//! Turns query parameters into post filters.
//!
//! A parameter is `<field>` or `<field>__<lookup>`. Parameters that do not
//! name one of the resource's fields are ignored; that is how `limit`,
//! `offset` and friends pass through untouched.

use crate::db::{Comparison, Condition, PostFilter, Scalar};
use crate::models::PostField;
use crate::types::{ApiError, ApiResult};

use super::ResourceDeclaration;

pub const LOOKUP_SEP: &str = "__";

fn comparison(lookup: &str) -> Option<Comparison> {
    let op = match lookup {
        "exact" => Comparison::Exact,
        "iexact" => Comparison::IExact,
        "contains" => Comparison::Contains,
        "icontains" => Comparison::IContains,
        "startswith" => Comparison::StartsWith,
        "istartswith" => Comparison::IStartsWith,
        "endswith" => Comparison::EndsWith,
        "iendswith" => Comparison::IEndsWith,
        "gt" => Comparison::Gt,
        "gte" => Comparison::Gte,
        "lt" => Comparison::Lt,
        "lte" => Comparison::Lte,
        _ => return None,
    };
    Some(op)
}

fn scalar(field: PostField, raw: &str) -> ApiResult<Scalar> {
    if field.is_integer() {
        raw.trim()
            .parse()
            .map(Scalar::Integer)
            .map_err(|_| ApiError::bad_request(format!("Invalid value '{raw}' for '{field}'.")))
    } else {
        Ok(Scalar::Text(raw.to_string()))
    }
}

fn is_null_literal(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "none" | "nil")
}

fn condition(field: PostField, lookup: &str, raw: &str) -> ApiResult<Condition> {
    match lookup {
        "in" => {
            let values = if raw.is_empty() {
                Vec::new()
            } else {
                raw.split(',')
                    .map(|item| scalar(field, item))
                    .collect::<ApiResult<Vec<_>>>()?
            };
            Ok(Condition::In(values))
        }
        "isnull" => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(Condition::IsNull(true)),
            "false" => Ok(Condition::IsNull(false)),
            _ => Err(ApiError::bad_request(format!(
                "Invalid value '{raw}' for '{field}{LOOKUP_SEP}isnull'."
            ))),
        },
        "exact" if is_null_literal(raw) => Ok(Condition::IsNull(true)),
        _ => {
            let op = comparison(lookup).ok_or_else(|| {
                ApiError::bad_request(format!("Lookup '{lookup}' not allowed on '{field}'."))
            })?;
            let value = if op.is_pattern() || op.is_case_insensitive() {
                Scalar::Text(raw.to_string())
            } else {
                scalar(field, raw)?
            };
            Ok(Condition::Compare(op, value))
        }
    }
}

/// Builds the filters requested by `params` for `resource`.
pub fn build_filters(
    resource: &ResourceDeclaration,
    params: &[(String, String)],
) -> ApiResult<Vec<PostFilter>> {
    let mut filters = Vec::new();

    for (key, raw) in params {
        let mut bits = key.split(LOOKUP_SEP);
        let field = bits
            .next()
            .and_then(PostField::from_name)
            .filter(|field| resource.fields.contains(field));
        let Some(field) = field else {
            continue;
        };

        if !resource.filtering.contains(&field) {
            return Err(ApiError::bad_request(format!(
                "The '{field}' field does not allow filtering."
            )));
        }

        let lookup = bits.collect::<Vec<_>>().join(LOOKUP_SEP);
        let lookup = if lookup.is_empty() { "exact" } else { lookup.as_str() };

        filters.push(PostFilter {
            field,
            condition: condition(field, lookup, raw)?,
        });
    }

    Ok(filters)
}
