pub mod cardinality;
pub use cardinality::*;

pub mod element_definition;
pub use element_definition::*;

pub mod element_type;
pub use element_type::*;

pub mod resource_definitions;
pub use resource_definitions::*;

use crate::utils::tokenize_path;

/// Read-only access to the structural definitions of resources and types.
///
/// Implementations are shared across concurrent compilations, so they must
/// not mutate after construction.
pub trait SchemaProvider: Send + Sync {
    /// Definition of a resource root, if `resource_type` names a resource.
    fn resource_definition(&self, resource_type: &str) -> Option<ElementDefinition>;

    /// Children declared by a named resource or complex type.
    fn type_elements(&self, type_code: &str) -> Option<&[ElementDefinition]>;

    fn is_resource_type(&self, name: &str) -> bool {
        self.resource_definition(name).is_some()
    }

    /// Child `name` of `parent`, looking at inline backbone children first.
    fn child_element(&self, parent: &ElementDefinition, name: &str) -> Option<ElementDefinition> {
        if parent.is_backbone() {
            return parent.inline_child(name).cloned();
        }
        self.type_elements(&parent.type_code)?
            .iter()
            .find(|e| e.name == name)
            .cloned()
    }

    /// Definition at a dotted element path such as `Condition.evidence`.
    ///
    /// The first segment names a resource or complex type; later segments
    /// walk children, including inline backbone ones.
    fn element_at(&self, path: &str) -> Option<ElementDefinition> {
        let segments = tokenize_path(path);
        let (root, rest) = segments.split_first()?;
        let mut current = match self.resource_definition(root) {
            Some(definition) => definition,
            None => {
                self.type_elements(root)?;
                ElementDefinition::resource_root(root)
            }
        };
        for segment in rest {
            current = self.child_element(&current, segment)?;
        }
        Some(current)
    }

    fn child_multiplicity(&self, type_name: &str, field_name: &str) -> Option<Cardinality> {
        let parent = self.element_at(type_name)?;
        self.child_element(&parent, field_name).map(|e| e.max)
    }

    fn child_type(&self, type_name: &str, field_name: &str) -> Option<String> {
        let parent = self.element_at(type_name)?;
        self.child_element(&parent, field_name).map(|e| e.type_code)
    }

    fn element_type(&self, definition: &ElementDefinition) -> ResolvedElementType {
        if self.is_resource_type(&definition.type_code) {
            ResolvedElementType::Resource
        } else if definition.type_code == "Reference" {
            ResolvedElementType::Reference
        } else if ResolvedElementType::is_primitive_type_code(&definition.type_code) {
            ResolvedElementType::Primitive
        } else {
            ResolvedElementType::Complex
        }
    }
}
