//! Directory search filter builder.
//!
//! The adapter composes its queries from object-class terms, equality terms,
//! and logical AND/OR over them — including ORs with an arbitrary number of
//! terms (one per candidate login identifier). Values are escaped per
//! RFC 4515 when the filter renders.

use std::fmt;

/// A directory search filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Equality term, `(attribute=value)`.
    Eq(String, String),

    /// Conjunction of sub-filters, `(&...)`.
    And(Vec<Filter>),

    /// Disjunction of sub-filters, `(|...)`.
    Or(Vec<Filter>),
}

impl Filter {
    /// Creates an equality term.
    #[must_use]
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq(attribute.into(), value.into())
    }

    /// Creates an object-class equality term.
    #[must_use]
    pub fn object_class(name: impl Into<String>) -> Self {
        Self::eq("objectClass", name)
    }

    /// Creates a conjunction. Callers must supply at least one sub-filter.
    #[must_use]
    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    /// Creates a disjunction. Callers must supply at least one sub-filter.
    #[must_use]
    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(attribute, value) => {
                write!(f, "({attribute}={})", escape(value))
            }
            // A single-term conjunction/disjunction renders as the term
            // itself, matching how hand-written filters read.
            Self::And(filters) | Self::Or(filters) if filters.len() == 1 => {
                filters[0].fmt(f)
            }
            Self::And(filters) => {
                write!(f, "(&")?;
                for filter in filters {
                    filter.fmt(f)?;
                }
                write!(f, ")")
            }
            Self::Or(filters) => {
                write!(f, "(|")?;
                for filter in filters {
                    filter.fmt(f)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Escapes special characters in filter values (RFC 4515).
fn escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\5c"),
            '*' => result.push_str("\\2a"),
            '(' => result.push_str("\\28"),
            ')' => result.push_str("\\29"),
            '\0' => result.push_str("\\00"),
            _ => result.push(c),
        }
    }
    result
}
