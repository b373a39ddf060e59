use serde::{Deserialize, Serialize};

/// Coarse classification of what an expression resolves to.
///
/// Only `Primitive` results may be used as grouping dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedElementType {
    /// A scalar FHIR type such as `code`, `string` or `dateTime`.
    Primitive,
    /// A structured data type or backbone element.
    Complex,
    /// A `Reference` element pointing at another resource.
    Reference,
    /// A whole resource.
    Resource,
}

impl ResolvedElementType {
    /// FHIR primitive type codes start with a lower-case letter.
    pub fn is_primitive_type_code(type_code: &str) -> bool {
        type_code.chars().next().is_some_and(|c| c.is_ascii_lowercase())
    }
}
