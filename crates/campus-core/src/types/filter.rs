//! Filter types for row-store query building.
//!
//! A [`Filter`] is both a wire-level query fragment for the remote store
//! and an in-memory predicate for the local fallback and the change feeds,
//! so every backend applies identical matching semantics.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::row::Row;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// List membership.
    In,
}

impl FilterOp {
    /// Wire token used in remote query strings.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }
}

/// A dynamic filter value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A string value (also used for UUIDs and timestamps).
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A list of string values (for the `In` operator).
    StringList(Vec<String>),
    /// Null / no value.
    Null,
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A single filter condition on a named field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    /// The column or field name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl Filter {
    /// Create a new filter condition.
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Eq, value.into())
    }

    /// Shorthand for a list-membership filter.
    pub fn is_in(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(field, FilterOp::In, FilterValue::StringList(values))
    }

    /// Render as a remote query-string pair, e.g. `("user_id", "eq.<uuid>")`.
    pub fn as_query_pair(&self) -> (String, String) {
        let rendered = match &self.value {
            FilterValue::String(s) => s.clone(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::Float(f) => f.to_string(),
            FilterValue::Boolean(b) => b.to_string(),
            FilterValue::StringList(list) => format!("({})", list.join(",")),
            FilterValue::Null => "null".to_string(),
        };
        (self.field.clone(), format!("{}.{}", self.op.token(), rendered))
    }

    /// Evaluate this filter against a row. A missing field is treated as null.
    pub fn matches(&self, row: &Row) -> bool {
        let actual = row.get(&self.field).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Eq => value_eq(actual, &self.value),
            FilterOp::Ne => !value_eq(actual, &self.value),
            FilterOp::Gt => compare(actual, &self.value).is_some_and(|o| o.is_gt()),
            FilterOp::Gte => compare(actual, &self.value).is_some_and(|o| o.is_ge()),
            FilterOp::Lt => compare(actual, &self.value).is_some_and(|o| o.is_lt()),
            FilterOp::Lte => compare(actual, &self.value).is_some_and(|o| o.is_le()),
            FilterOp::In => match &self.value {
                FilterValue::StringList(list) => match actual {
                    Value::String(s) => list.iter().any(|candidate| candidate == s),
                    _ => false,
                },
                _ => false,
            },
        }
    }
}

fn value_eq(actual: &Value, expected: &FilterValue) -> bool {
    match expected {
        FilterValue::String(s) => actual.as_str() == Some(s.as_str()),
        FilterValue::Integer(i) => actual.as_i64() == Some(*i),
        FilterValue::Float(f) => actual.as_f64() == Some(*f),
        FilterValue::Boolean(b) => actual.as_bool() == Some(*b),
        FilterValue::Null => actual.is_null(),
        FilterValue::StringList(_) => false,
    }
}

fn compare(actual: &Value, expected: &FilterValue) -> Option<std::cmp::Ordering> {
    match expected {
        // Timestamps travel as RFC 3339 strings, which order lexicographically.
        FilterValue::String(s) => actual.as_str().map(|a| a.cmp(s.as_str())),
        FilterValue::Integer(i) => actual.as_f64().and_then(|a| a.partial_cmp(&(*i as f64))),
        FilterValue::Float(f) => actual.as_f64().and_then(|a| a.partial_cmp(f)),
        _ => None,
    }
}
