//! Query conditions over the post table and their SQL rendering.

use sqlx::{Postgres, QueryBuilder};

use crate::models::PostField;

/// A literal compared against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Text(String),
    Integer(i32),
}

impl Scalar {
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Integer(i) => i.to_string(),
        }
    }
}

/// Binary lookups accepted after `__` in a filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Exact,
    IExact,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Comparison::Contains
                | Comparison::IContains
                | Comparison::StartsWith
                | Comparison::IStartsWith
                | Comparison::EndsWith
                | Comparison::IEndsWith
        )
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            Comparison::IExact | Comparison::IContains | Comparison::IStartsWith | Comparison::IEndsWith
        )
    }

    /// LIKE pattern for `value`, with wildcards in the value escaped.
    pub fn like_pattern(&self, value: &str) -> String {
        let escaped = escape_like(value);
        match self {
            Comparison::Contains | Comparison::IContains => format!("%{escaped}%"),
            Comparison::StartsWith | Comparison::IStartsWith => format!("{escaped}%"),
            Comparison::EndsWith | Comparison::IEndsWith => format!("%{escaped}"),
            _ => escaped,
        }
    }

    fn sql_operator(&self) -> &'static str {
        match self {
            Comparison::Gt => " > ",
            Comparison::Gte => " >= ",
            Comparison::Lt => " < ",
            Comparison::Lte => " <= ",
            _ => " = ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Compare(Comparison, Scalar),
    In(Vec<Scalar>),
    IsNull(bool),
}

/// One `WHERE` clause term on a post column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub field: PostField,
    pub condition: Condition,
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_scalar(qb: &mut QueryBuilder<'_, Postgres>, value: &Scalar) {
    match value {
        Scalar::Text(s) => qb.push_bind(s.clone()),
        Scalar::Integer(i) => qb.push_bind(*i),
    };
}

impl PostFilter {
    /// Appends this filter as ` AND <term>` to a query that already has a `WHERE`.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let column = self.field.name();
        qb.push(" AND ");

        match &self.condition {
            Condition::Compare(op, value) if op.is_pattern() => {
                let pattern = op.like_pattern(&value.as_text());
                if op.is_case_insensitive() {
                    qb.push(format!("UPPER({column}::text) LIKE UPPER("))
                        .push_bind(pattern)
                        .push(")");
                } else {
                    qb.push(format!("{column}::text LIKE ")).push_bind(pattern);
                }
            }
            Condition::Compare(Comparison::IExact, value) => {
                qb.push(format!("UPPER({column}::text) = UPPER("))
                    .push_bind(value.as_text())
                    .push(")");
            }
            Condition::Compare(op, value) => {
                qb.push(column).push(op.sql_operator());
                push_scalar(qb, value);
            }
            Condition::In(values) if values.is_empty() => {
                qb.push("FALSE");
            }
            Condition::In(values) => {
                qb.push(column).push(" = ANY(");
                if self.field.is_integer() {
                    let ints: Vec<i32> = values
                        .iter()
                        .filter_map(|v| match v {
                            Scalar::Integer(i) => Some(*i),
                            Scalar::Text(_) => None,
                        })
                        .collect();
                    qb.push_bind(ints);
                } else {
                    let texts: Vec<String> = values.iter().map(Scalar::as_text).collect();
                    qb.push_bind(texts);
                }
                qb.push(")");
            }
            Condition::IsNull(true) => {
                qb.push(column).push(" IS NULL");
            }
            Condition::IsNull(false) => {
                qb.push(column).push(" IS NOT NULL");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(filter: PostFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM blog_blogpost WHERE status = 2");
        filter.push_sql(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(Comparison::IStartsWith.like_pattern("a_b"), "a\\_b%");
    }

    #[test]
    fn test_exact_sql() {
        let sql = render(PostFilter {
            field: PostField::Slug,
            condition: Condition::Compare(Comparison::Exact, Scalar::Text("hello".into())),
        });
        assert_eq!(sql, "SELECT id FROM blog_blogpost WHERE status = 2 AND slug = $1");
    }

    #[test]
    fn test_icontains_sql() {
        let sql = render(PostFilter {
            field: PostField::Title,
            condition: Condition::Compare(Comparison::IContains, Scalar::Text("rust".into())),
        });
        assert!(sql.ends_with("AND UPPER(title::text) LIKE UPPER($1)"));
    }

    #[test]
    fn test_in_and_isnull_sql() {
        let sql = render(PostFilter {
            field: PostField::Id,
            condition: Condition::In(vec![Scalar::Integer(1), Scalar::Integer(2)]),
        });
        assert!(sql.ends_with("AND id = ANY($1)"));

        let sql = render(PostFilter {
            field: PostField::Slug,
            condition: Condition::In(vec![]),
        });
        assert!(sql.ends_with("AND FALSE"));

        let sql = render(PostFilter {
            field: PostField::Slug,
            condition: Condition::IsNull(false),
        });
        assert!(sql.ends_with("AND slug IS NOT NULL"));
    }
}
