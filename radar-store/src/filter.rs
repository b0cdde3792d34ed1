//! Document filters.

use serde_json::Value;

/// A predicate over top-level fields of a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// `field == value`.
    Eq(String, Value),
    /// `field` is present and equal to one of `values`.
    In(String, Vec<Value>),
    /// `field` is absent or equal to none of `values`.
    NotIn(String, Vec<Value>),
    /// Every sub-filter matches.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn is_in<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(field.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn not_in<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::NotIn(field.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => document.get(field) == Some(value),
            Filter::In(field, values) => document
                .get(field)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            Filter::NotIn(field, values) => document
                .get(field)
                .map(|v| !values.contains(v))
                .unwrap_or(true),
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
        }
    }
}
