use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::SchemaError,
    schema::{ElementDefinition, ResolvedElementType, SchemaProvider},
};

const BUNDLED_R4_SUBSET: &str = include_str!("definitions/r4_subset.json");

/// A named resource or complex type and the elements it declares.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default)]
    pub elements: Vec<ElementDefinition>,
}

#[derive(Debug, Deserialize)]
struct DefinitionsFile {
    #[serde(default)]
    resources: Vec<TypeDefinition>,
    #[serde(default)]
    types: Vec<TypeDefinition>,
}

/// Registry of resource and complex type definitions.
///
/// Built once (from JSON or the bundled R4 subset) and immutable afterwards,
/// so a single instance can be shared behind an `Arc` by concurrent planners.
#[derive(Debug, Clone, Default)]
pub struct ResourceDefinitions {
    resources: IndexMap<String, TypeDefinition>,
    types: IndexMap<String, TypeDefinition>,
}

impl ResourceDefinitions {
    /// Definitions for the handful of R4 resources shipped with the crate.
    pub fn bundled() -> Result<Self, SchemaError> {
        Self::from_json(BUNDLED_R4_SUBSET)
    }

    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let file: DefinitionsFile = serde_json::from_str(text)?;
        let definitions = Self {
            resources: file.resources.into_iter().map(|t| (t.name.clone(), t)).collect(),
            types: file.types.into_iter().map(|t| (t.name.clone(), t)).collect(),
        };
        definitions.validate()?;
        debug!(
            resources = definitions.resources.len(),
            types = definitions.types.len(),
            "loaded resource definitions"
        );
        Ok(definitions)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn resource_types(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }

    fn validate(&self) -> Result<(), SchemaError> {
        for owner in self.resources.values().chain(self.types.values()) {
            if self.resources.contains_key(&owner.name) && self.types.contains_key(&owner.name) {
                return Err(SchemaError::Invalid(format!("{} is declared as both a resource and a type", owner.name)));
            }
            self.validate_elements(&owner.name, &owner.elements)?;
        }
        Ok(())
    }

    fn validate_elements(&self, owner: &str, elements: &[ElementDefinition]) -> Result<(), SchemaError> {
        for element in elements {
            let path = format!("{}.{}", owner, element.name);
            if element.is_backbone() {
                self.validate_elements(&path, &element.elements)?;
            } else if !ResolvedElementType::is_primitive_type_code(&element.type_code)
                && !self.types.contains_key(&element.type_code)
                && !self.resources.contains_key(&element.type_code)
            {
                return Err(SchemaError::Invalid(format!("{} has unknown type {}", path, element.type_code)));
            }
            for target in &element.targets {
                if !self.resources.contains_key(target) {
                    return Err(SchemaError::Invalid(format!("{} targets unknown resource {}", path, target)));
                }
            }
        }
        Ok(())
    }
}

impl SchemaProvider for ResourceDefinitions {
    fn resource_definition(&self, resource_type: &str) -> Option<ElementDefinition> {
        self.resources
            .get(resource_type)
            .map(|r| ElementDefinition::resource_root(&r.name))
    }

    fn type_elements(&self, type_code: &str) -> Option<&[ElementDefinition]> {
        self.resources
            .get(type_code)
            .or_else(|| self.types.get(type_code))
            .map(|t| t.elements.as_slice())
    }

    fn is_resource_type(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }
}
