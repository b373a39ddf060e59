use std::fmt;

use crate::parser::ParseError;

/// Errors raised while compiling expressions into a query plan.
///
/// Every variant except `Internal` describes a problem with the caller's
/// input and is safe to surface directly. `Internal` means the compiler broke
/// one of its own invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanError {
    /// The expression could not be tokenized or parsed.
    Syntax { expression: String, error: ParseError },
    /// The expression parsed but is semantically invalid.
    InvalidExpression { expression: String, message: String },
    /// The query contained no aggregations.
    EmptyAggregation,
    /// A query component was supplied without an expression.
    MissingExpression { component: &'static str },
    /// A grouping resolved to something that is not a primitive value.
    NonPrimitiveGrouping { expression: String, type_code: String },
    /// Groupings reference tables that no aggregation touches.
    UnreferencedGroupingTables(Vec<String>),
    /// A compiler invariant was violated.
    Internal(String),
}

impl PlanError {
    pub fn invalid(expression: impl Into<String>, message: impl Into<String>) -> Self {
        PlanError::InvalidExpression { expression: expression.into(), message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PlanError::Internal(message.into())
    }

    pub fn is_user_error(&self) -> bool {
        !matches!(self, PlanError::Internal(_))
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Syntax { expression, error } => {
                write!(f, "Invalid expression '{}': {}", expression, error)
            }
            PlanError::InvalidExpression { message, .. } => write!(f, "{}", message),
            PlanError::EmptyAggregation => {
                write!(f, "Missing aggregation component within query")
            }
            PlanError::MissingExpression { component } => {
                write!(f, "{} component must have expression", component)
            }
            PlanError::NonPrimitiveGrouping { expression, type_code } => {
                write!(f, "Grouping expression is not of primitive type: {} ({})", expression, type_code)
            }
            PlanError::UnreferencedGroupingTables(tables) => {
                write!(
                    f,
                    "Groupings contain one or more resources that are not the subject of an aggregation: {}",
                    tables.join(", ")
                )
            }
            PlanError::Internal(message) => write!(f, "Internal planner error: {}", message),
        }
    }
}

impl std::error::Error for PlanError {}

/// Errors raised while loading schema definitions or planner configuration.
#[derive(Debug)]
pub enum SchemaError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Json {
        source: serde_json::Error,
    },
    /// Definitions parsed but are internally inconsistent.
    Invalid(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Io { path, source } => write!(f, "Failed to read '{}': {}", path, source),
            SchemaError::Json { source } => write!(f, "Invalid JSON: {}", source),
            SchemaError::Invalid(message) => write!(f, "Invalid definitions: {}", message),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Io { source, .. } => Some(source),
            SchemaError::Json { source } => Some(source),
            SchemaError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Json { source: err }
    }
}
