use serde::{Deserialize, Serialize};

/// Maximum number of values a structural field may hold.
///
/// Definitions spell this the way FHIR does: `"1"` for at most one value and
/// `"*"` for an unbounded collection. Missing `max` keys default to `One`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// At most one value; traversal keeps the row count.
    #[default]
    #[serde(rename = "1")]
    One,
    /// Any number of values; traversal explodes rows.
    #[serde(rename = "*")]
    Many,
}

impl Cardinality {
    pub fn is_many(self) -> bool {
        self == Cardinality::Many
    }
}
