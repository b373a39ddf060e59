use serde::{Deserialize, Serialize};

use crate::schema::Cardinality;

/// Structural definition of one element (or of a resource root).
///
/// `elements` is only populated for backbone elements, whose children are
/// declared inline rather than through a named complex type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_code: String,
    #[serde(default)]
    pub max: Cardinality,
    /// Resource types a `Reference` element may point at.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementDefinition>,
}

impl ElementDefinition {
    pub fn new(name: &str, type_code: &str, max: Cardinality) -> Self {
        Self {
            name: name.to_string(),
            type_code: type_code.to_string(),
            max,
            targets: vec![],
            elements: vec![],
        }
    }

    /// The root of a resource: a singular element named and typed after it.
    pub fn resource_root(resource_type: &str) -> Self {
        Self::new(resource_type, resource_type, Cardinality::One)
    }

    pub fn with_targets(mut self, targets: &[&str]) -> Self {
        self.targets = targets.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn inline_child(&self, name: &str) -> Option<&ElementDefinition> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn is_backbone(&self) -> bool {
        !self.elements.is_empty()
    }
}
