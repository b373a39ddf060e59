use std::fmt::{self, Display};

use chrono::NaiveDate;
use ordered_float::NotNan;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Integer(i64),
    Decimal(NotNan<f64>),
    Boolean(bool),
    Date(NaiveDate),
}

impl Literal {
    /// FHIR primitive type code of the literal.
    pub fn type_code(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Integer(_) => "integer",
            Literal::Decimal(_) => "decimal",
            Literal::Boolean(_) => "boolean",
            Literal::Date(_) => "date",
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            Literal::String(s) => format!("'{}'", s.replace('\'', "\\'")),
            Literal::Integer(i) => i.to_string(),
            Literal::Decimal(d) => format!("{:?}", d.into_inner()),
            Literal::Boolean(b) => b.to_string(),
            Literal::Date(d) => format!("DATE '{}'", d.format("%Y-%m-%d")),
        }
    }
}

/// Renders the literal back in path-expression syntax.
impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Decimal(d) => write!(f, "{:?}", d.into_inner()),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Date(d) => write!(f, "@{}", d.format("%Y-%m-%d")),
        }
    }
}
