//! SQL filters available inside macros
//!
//! Every filter yields a fragment that can be pasted into a statement as-is:
//! a missing value becomes `NULL`, never the template engine's `none`.

use minijinja::value::ValueKind;
use minijinja::{Environment, Value};

/// SQL-specific filters
pub struct SqlFilters;

impl SqlFilters {
    /// Render a value as a SQL literal
    ///
    /// Strings are single-quoted, numbers stay bare, booleans become
    /// `TRUE`/`FALSE` and undefined or none becomes `NULL`.
    pub fn sqlquote(value: &Value) -> String {
        match value.kind() {
            ValueKind::Undefined | ValueKind::None => "NULL".to_string(),
            ValueKind::Bool => (if value.is_true() { "TRUE" } else { "FALSE" }).to_string(),
            ValueKind::Number => value.to_string(),
            _ => match value.as_str() {
                Some(s) => quote_literal(s),
                None => quote_literal(&value.to_string()),
            },
        }
    }

    /// Build an `IN (...)` list of literals
    ///
    /// An empty or missing list renders `(NULL)`, which matches no row
    /// but keeps the statement valid. A scalar becomes a one-item list.
    pub fn inclause(value: &Value) -> String {
        let items: Vec<String> = match value.kind() {
            ValueKind::Undefined | ValueKind::None => Vec::new(),
            ValueKind::Seq | ValueKind::Iterable => value
                .try_iter()
                .map(|iter| iter.map(|item| Self::sqlquote(&item)).collect())
                .unwrap_or_default(),
            _ => vec![Self::sqlquote(value)],
        };

        if items.is_empty() {
            return "(NULL)".to_string();
        }
        format!("({})", items.join(", "))
    }

    /// Quote a possibly schema-qualified identifier
    ///
    /// `sales.orders` becomes `"sales"."orders"`; embedded double quotes
    /// are doubled.
    pub fn identifier(value: &str) -> String {
        value
            .split('.')
            .map(|part| format!("\"{}\"", part.trim().replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub(crate) fn register_filters(env: &mut Environment<'_>) {
    env.add_filter("sqlquote", |value: Value| SqlFilters::sqlquote(&value));
    env.add_filter("inclause", |value: Value| SqlFilters::inclause(&value));
    env.add_filter("identifier", |value: String| SqlFilters::identifier(&value));
}
