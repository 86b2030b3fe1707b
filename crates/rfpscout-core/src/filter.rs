//! Typed builder for search-service filter expressions
//!
//! Renders to the Algolia filter grammar: `field<op>value` clauses joined
//! with `AND`. Caller-supplied filter text is carried as [`FilterExpr::Raw`]
//! and is only accepted once its quotes and parentheses balance.

use crate::error::{Result, RfpScoutError};
use std::fmt;

/// Comparison operator of a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Gte,
    Lte,
    Gt,
    Lt,
    Eq,
    /// Facet match (`field:value`)
    Facet,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Eq => "=",
            FilterOp::Facet => ":",
        }
    }
}

/// Right-hand side of a clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Int(i64),
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl FilterValue {
    fn render(&self) -> String {
        match self {
            FilterValue::Int(v) => v.to_string(),
            FilterValue::Text(s) if is_bare_token(s) => s.clone(),
            FilterValue::Text(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
        }
    }
}

fn is_bare_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Filter expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    Clause {
        field: String,
        op: FilterOp,
        value: FilterValue,
    },
    And(Vec<FilterExpr>),
    /// Validated caller-supplied filter text
    Raw(String),
}

impl FilterExpr {
    pub fn clause(field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        FilterExpr::Clause {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Inclusive numeric range on one field
    pub fn between(field: &str, start: i64, end: i64) -> Self {
        FilterExpr::And(vec![
            Self::clause(field, FilterOp::Gte, start),
            Self::clause(field, FilterOp::Lte, end),
        ])
    }

    /// Accept caller filter text after checking it is well formed
    pub fn raw(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RfpScoutError::InvalidFilter("filter is empty".to_string()));
        }
        check_balanced(text)?;
        Ok(FilterExpr::Raw(text.to_string()))
    }

    /// Conjunction of two expressions
    pub fn and(self, other: FilterExpr) -> Self {
        FilterExpr::And(vec![self, other])
    }

    /// Combine an optional date filter with an optional caller filter
    pub fn combine(date: Option<FilterExpr>, caller: Option<FilterExpr>) -> Option<FilterExpr> {
        match (date, caller) {
            (Some(date), Some(caller)) => Some(date.and(caller)),
            (Some(date), None) => Some(date),
            (None, caller) => caller,
        }
    }

    /// Render to the search service's filter grammar
    pub fn render(&self) -> String {
        match self {
            FilterExpr::Clause { field, op, value } => {
                format!("{}{}{}", field, op.as_str(), value.render())
            }
            FilterExpr::Raw(text) => text.clone(),
            FilterExpr::And(parts) if parts.len() == 1 => parts[0].render(),
            FilterExpr::And(parts) => parts
                .iter()
                .map(|p| match p {
                    FilterExpr::Clause { .. } => p.render(),
                    _ => format!("({})", p.render()),
                })
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn check_balanced(text: &str) -> Result<()> {
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth -= 1;
                if depth < 0 {
                    return Err(RfpScoutError::InvalidFilter(format!(
                        "unbalanced ')' in \"{}\"",
                        text
                    )));
                }
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(RfpScoutError::InvalidFilter(format!(
            "unterminated quote in \"{}\"",
            text
        )));
    }
    if depth != 0 {
        return Err(RfpScoutError::InvalidFilter(format!(
            "unbalanced '(' in \"{}\"",
            text
        )));
    }
    Ok(())
}
