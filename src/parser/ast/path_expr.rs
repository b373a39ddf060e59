use std::fmt::{self, Display};

use crate::parser::ast::Literal;

/// Syntax tree of a path expression.
///
/// Member access and function invocation carry an optional target: `None`
/// means the invocation applies to the input context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathExpr {
    Literal(Literal),
    This,
    Member {
        target: Option<Box<PathExpr>>,
        name: String,
    },
    Function {
        target: Option<Box<PathExpr>>,
        name: String,
        args: Vec<PathExpr>,
    },
}

impl PathExpr {
    pub fn member(target: Option<PathExpr>, name: &str) -> Self {
        PathExpr::Member { target: target.map(Box::new), name: name.to_string() }
    }

    pub fn function(target: Option<PathExpr>, name: &str, args: Vec<PathExpr>) -> Self {
        PathExpr::Function { target: target.map(Box::new), name: name.to_string(), args }
    }

    /// Identifier the path starts from, when it starts from one.
    pub fn root_identifier(&self) -> Option<&str> {
        match self {
            PathExpr::Member { target: None, name } => Some(name),
            PathExpr::Member { target: Some(target), .. } | PathExpr::Function { target: Some(target), .. } => {
                target.root_identifier()
            }
            _ => None,
        }
    }

    fn is_plain_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_')
    }

    fn fmt_identifier(name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if Self::is_plain_identifier(name) {
            write!(f, "{}", name)
        } else {
            write!(f, "`{}`", name)
        }
    }
}

impl Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathExpr::Literal(literal) => write!(f, "{}", literal),
            PathExpr::This => write!(f, "$this"),
            PathExpr::Member { target, name } => {
                if let Some(target) = target {
                    write!(f, "{}.", target)?;
                }
                Self::fmt_identifier(name, f)
            }
            PathExpr::Function { target, name, args } => {
                if let Some(target) = target {
                    write!(f, "{}.", target)?;
                }
                Self::fmt_identifier(name, f)?;
                write!(f, "(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
