use tracing::trace;

use crate::{
    error::PlanError,
    parser::analyzer::{ParseResult, ParserContext},
    planner::Join,
    utils::{path_to_lower_camel_case, tokenize_path},
};

/// Advances a parsed path across one child field.
///
/// Singular children extend the SQL expression in place. Repeating children
/// are exploded by a lateral view, whose alias becomes the new SQL root.
pub struct PathTraversal;

impl PathTraversal {
    pub fn traverse(left: &ParseResult, field: &str, ctx: &mut ParserContext) -> Result<ParseResult, PlanError> {
        let expression = Self::child_expression(left, field, ctx);

        if left.literal {
            return Err(PlanError::invalid(
                &expression,
                format!("Path traversal operator cannot be invoked on a literal value: {}", left.expression),
            ));
        }

        let child = left
            .definition
            .as_ref()
            .and_then(|definition| ctx.schema.child_element(definition, field))
            .ok_or_else(|| PlanError::invalid(&expression, format!("No such child: {}", expression)))?;

        let many = child.max.is_many();
        let mut result = ParseResult {
            expression,
            sql_expression: format!("{}.{}", left.sql_expression, field),
            result_type: ctx.schema.element_type(&child),
            result_type_code: child.type_code.clone(),
            definition: None,
            from_tables: left.from_tables.clone(),
            joins: left.joins.clone(),
            head_join: left.head_join,
            index_expression: None,
            eid_expression: None,
            singular: left.singular && !many,
            literal: false,
            frame: left.frame.as_ref().map(|frame| frame.traverse(field, child.max)),
        };

        if many {
            let udtf = result.sql_expression.clone();
            let alias = path_to_lower_camel_case(&tokenize_path(&udtf));
            let view = Join::lateral_view(&udtf, &alias, &result.expression).depending_upon(left.head_join);
            let id = ctx.joins.insert(view);

            result.sql_expression = alias;
            result.joins.insert(id);
            result.head_join = Some(id);
        }
        Self::track_identity(left, &mut result, many);

        trace!(
            expression = %result.expression,
            sql = %result.sql_expression,
            many,
            "traversed child"
        );
        result.definition = Some(child);
        Ok(result)
    }

    /// Sets the element position and extends the element identity by it.
    ///
    /// A repeating step reads the position of its view; a singular step is at
    /// position `0` when present. A NULL position makes the identity NULL.
    fn track_identity(left: &ParseResult, result: &mut ParseResult, many: bool) {
        let (present, position) = if many {
            let column = Join::position_column(&result.sql_expression);
            (column.clone(), column)
        } else {
            (result.sql_expression.clone(), "0".to_string())
        };

        let extended = match &left.eid_expression {
            Some(eid) => format!("concat({}, array({}))", eid, position),
            None => format!("array({})", position),
        };
        result.eid_expression = Some(format!("CASE WHEN {} IS NULL THEN NULL ELSE {} END", present, extended));
        result.index_expression = Some(if many {
            present
        } else {
            format!("CASE WHEN {} IS NULL THEN NULL ELSE 0 END", present)
        });
    }

    /// Path text of the child, leaving out the input context itself.
    fn child_expression(left: &ParseResult, field: &str, ctx: &ParserContext) -> String {
        if left.expression == ctx.input_context().expression {
            field.to_string()
        } else {
            format!("{}.{}", left.expression, field)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        config::PlannerConfig,
        executor::Frame,
        parser::functions::FunctionRegistry,
        planner::{JoinGraph, JoinKind},
        schema::{ResolvedElementType, ResourceDefinitions},
    };

    #[test]
    fn test_singular_child_extends_sql() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let subject = ctx.subject.clone();
        let class = PathTraversal::traverse(&subject, "class", &mut ctx).unwrap();
        assert_eq!(class.expression, "class");
        assert_eq!(class.sql_expression, "Encounter.class");
        assert_eq!(class.result_type, ResolvedElementType::Complex);
        assert!(class.singular);
        assert!(class.joins.is_empty());

        let code = PathTraversal::traverse(&class, "code", &mut ctx).unwrap();
        assert_eq!(code.expression, "class.code");
        assert_eq!(code.sql_expression, "Encounter.class.code");
        assert_eq!(code.result_type, ResolvedElementType::Primitive);
        assert_eq!(code.result_type_code, "code");
        drop(ctx);
        assert!(joins.is_empty());
    }

    #[test]
    fn test_repeating_child_adds_lateral_view() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let subject = ctx.subject.clone();
        let reason = PathTraversal::traverse(&subject, "reasonCode", &mut ctx).unwrap();
        let coding = PathTraversal::traverse(&reason, "coding", &mut ctx).unwrap();
        assert_eq!(reason.sql_expression, "encounterReasonCode");
        assert_eq!(coding.sql_expression, "encounterReasonCodeCoding");
        assert!(!coding.singular);
        assert_eq!(coding.joins.len(), 2);
        drop(ctx);

        let first = reason.head_join.unwrap();
        let second = coding.head_join.unwrap();
        assert_eq!(joins[first].kind, JoinKind::LateralView);
        assert_eq!(
            joins[second].expression,
            "LATERAL VIEW OUTER posexplode(encounterReasonCode.coding) encounterReasonCodeCoding AS encounterReasonCodeCodingIndex, encounterReasonCodeCoding"
        );
        assert_eq!(joins[second].depends_upon, Some(first));
        assert_eq!(joins[second].root_expression, "reasonCode.coding");
    }

    #[test]
    fn test_steps_track_position_and_identity() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let subject = ctx.subject.clone();
        assert_eq!(subject.eid_expression, None);

        let class = PathTraversal::traverse(&subject, "class", &mut ctx).unwrap();
        assert_eq!(
            class.index_expression.as_deref(),
            Some("CASE WHEN Encounter.class IS NULL THEN NULL ELSE 0 END")
        );
        assert_eq!(
            class.eid_expression.as_deref(),
            Some("CASE WHEN Encounter.class IS NULL THEN NULL ELSE array(0) END")
        );

        let reason = PathTraversal::traverse(&subject, "reasonCode", &mut ctx).unwrap();
        assert_eq!(reason.index_expression.as_deref(), Some("encounterReasonCodeIndex"));
        assert_eq!(
            reason.eid_expression.as_deref(),
            Some("CASE WHEN encounterReasonCodeIndex IS NULL THEN NULL ELSE array(encounterReasonCodeIndex) END")
        );

        let coding = PathTraversal::traverse(&reason, "coding", &mut ctx).unwrap();
        assert_eq!(coding.index_expression.as_deref(), Some("encounterReasonCodeCodingIndex"));
        assert_eq!(
            coding.eid_expression.as_deref(),
            Some(
                "CASE WHEN encounterReasonCodeCodingIndex IS NULL THEN NULL ELSE \
                 concat(CASE WHEN encounterReasonCodeIndex IS NULL THEN NULL ELSE array(encounterReasonCodeIndex) END, \
                 array(encounterReasonCodeCodingIndex)) END"
            )
        );
    }

    #[test]
    fn test_backbone_children_are_found_inline() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let subject = ctx.subject.clone();
        let participant = PathTraversal::traverse(&subject, "participant", &mut ctx).unwrap();
        let individual = PathTraversal::traverse(&participant, "individual", &mut ctx).unwrap();
        assert_eq!(individual.result_type, ResolvedElementType::Reference);
        assert_eq!(individual.sql_expression, "encounterParticipant.individual");
        assert_eq!(individual.head_join, participant.head_join);
    }

    #[test]
    fn test_traversal_errors() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let subject = ctx.subject.clone();
        let err = PathTraversal::traverse(&subject, "colour", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "No such child: colour");
        assert!(err.is_user_error());

        let literal = ParseResult::literal(&crate::parser::ast::Literal::String("x".into()));
        let err = PathTraversal::traverse(&literal, "length", &mut ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Path traversal operator cannot be invoked on a literal value: 'x'"
        );
    }

    #[test]
    fn test_frame_follows_traversal() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let frame = Frame::from_resources(
            &[
                json!({ "id": "e1", "type": [ { "text": "a" }, { "text": "b" } ] }),
                json!({ "id": "e2" }),
            ],
            "id",
        );
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter")
            .unwrap()
            .with_frame(frame);

        let subject = ctx.subject.clone();
        let types = PathTraversal::traverse(&subject, "type", &mut ctx).unwrap();
        let frame = types.frame.unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.rows()[2].index, None);
    }
}
