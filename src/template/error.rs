//! Template error type

use thiserror::Error;

/// Errors raised while parsing or rendering a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unresolved variable(s) {} (first at line {line})", .names.join(", "))]
    Unresolved { names: Vec<String>, line: usize },

    #[error("malformed placeholder at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("variable '{name}' must not be empty")]
    EmptyValue { name: String },
}
