use std::collections::BTreeSet;

use indexmap::IndexSet;
use serde::Serialize;

use crate::{
    executor::Frame,
    parser::ast::Literal,
    planner::{ColumnRef, JoinId},
    schema::{ElementDefinition, ResolvedElementType},
    utils::tokenize_path,
};

/// What a parsed expression compiles to: its SQL column expression, its type,
/// the tables it reads from and the joins it needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub expression: String,
    pub sql_expression: String,
    pub result_type: ResolvedElementType,
    pub result_type_code: String,
    /// Schema element the result points at; absent for literals and most
    /// function results, which cannot be traversed further.
    #[serde(skip)]
    pub definition: Option<ElementDefinition>,
    pub from_tables: IndexSet<String>,
    pub joins: BTreeSet<JoinId>,
    /// Join whose alias roots `sql_expression`.
    pub head_join: Option<JoinId>,
    /// Position of the element within its collection: `0` or NULL after a
    /// singular step, the exploded position after a repeating one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_expression: Option<String>,
    /// Element identity (`eid`) within the base resource row. `None` while
    /// no step has been taken from a resource root, where it is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eid_expression: Option<String>,
    pub singular: bool,
    pub literal: bool,
    #[serde(skip)]
    pub frame: Option<Frame>,
}

impl ParseResult {
    /// The root of a resource table.
    pub fn resource(resource_type: &str, definition: ElementDefinition) -> Self {
        Self {
            expression: resource_type.to_string(),
            sql_expression: resource_type.to_string(),
            result_type: ResolvedElementType::Resource,
            result_type_code: resource_type.to_string(),
            definition: Some(definition),
            from_tables: IndexSet::from([resource_type.to_string()]),
            joins: BTreeSet::new(),
            head_join: None,
            index_expression: None,
            eid_expression: None,
            singular: true,
            literal: false,
            frame: None,
        }
    }

    pub fn literal(literal: &Literal) -> Self {
        Self {
            expression: literal.to_string(),
            sql_expression: literal.to_sql(),
            result_type: ResolvedElementType::Primitive,
            result_type_code: literal.type_code().to_string(),
            definition: None,
            from_tables: IndexSet::new(),
            joins: BTreeSet::new(),
            head_join: None,
            index_expression: None,
            eid_expression: None,
            singular: true,
            literal: true,
            frame: None,
        }
    }

    pub fn is_resource(&self) -> bool {
        self.result_type == ResolvedElementType::Resource
    }

    /// Table name or join alias the SQL expression starts from.
    pub fn sql_root(&self) -> &str {
        tokenize_path(&self.sql_expression)
            .first()
            .copied()
            .unwrap_or(self.sql_expression.as_str())
    }

    /// Structured reference to `field` below this result, e.g. `subject` on
    /// `Encounter.subject` gives `Encounter` / `subject.<field>`.
    pub fn column_ref(&self, field: &str) -> ColumnRef {
        let parts = tokenize_path(&self.sql_expression);
        let mut path: Vec<&str> = parts.iter().skip(1).copied().collect();
        path.push(field);
        ColumnRef::new(self.sql_root(), path.join("."))
    }
}
