use tracing::debug;

use crate::{
    error::PlanError,
    parser::{
        analyzer::{ParseResult, ParserContext, PathTraversal},
        ast::{PathExpr, PathExprParser},
        functions::FunctionInput,
    },
};

/// Compiles path expression text into a `ParseResult`.
pub struct ExpressionParser;

impl ExpressionParser {
    pub fn parse(text: &str, ctx: &mut ParserContext) -> Result<ParseResult, PlanError> {
        let expr = PathExprParser::parse(text).map_err(|error| PlanError::Syntax {
            expression: text.to_string(),
            error,
        })?;

        let result = Self::evaluate(&expr, ctx)?;
        debug!(
            expression = %text,
            sql = %result.sql_expression,
            result_type = ?result.result_type,
            joins = result.joins.len(),
            "parsed expression"
        );
        Ok(result)
    }

    pub fn evaluate(expr: &PathExpr, ctx: &mut ParserContext) -> Result<ParseResult, PlanError> {
        match expr {
            PathExpr::Literal(literal) => Ok(ParseResult::literal(literal)),
            PathExpr::This => Ok(ctx.input_context().clone()),
            PathExpr::Member { target: None, name } => {
                if let Some(root) = Self::resource_root(name, ctx) {
                    return Ok(root);
                }
                let input = ctx.input_context().clone();
                PathTraversal::traverse(&input, name, ctx)
            }
            PathExpr::Member { target: Some(target), name } => {
                let left = Self::evaluate(target, ctx)?;
                PathTraversal::traverse(&left, name, ctx)
            }
            PathExpr::Function { target, name, args } => {
                let input = match target {
                    Some(target) => Self::evaluate(target, ctx)?,
                    None => ctx.input_context().clone(),
                };
                let expression = Self::invocation_expression(&input, expr, ctx);
                let function = ctx
                    .functions
                    .get(name)
                    .ok_or_else(|| PlanError::invalid(&expression, format!("Unrecognised function: {}", name)))?;

                function.invoke(FunctionInput { input, args, expression }, ctx)
            }
        }
    }

    /// An upper-case identifier naming a resource type roots the path at that
    /// resource. The subject keeps its frame.
    fn resource_root(name: &str, ctx: &ParserContext) -> Option<ParseResult> {
        if !name.chars().next().is_some_and(char::is_uppercase) || !ctx.schema.is_resource_type(name) {
            return None;
        }
        if ctx.subject.result_type_code == name {
            return Some(ctx.subject.clone());
        }
        ParserContext::resource_root(ctx.schema, name)
    }

    fn invocation_expression(input: &ParseResult, expr: &PathExpr, ctx: &ParserContext) -> String {
        let call = match expr {
            PathExpr::Function { name, args, .. } => PathExpr::function(None, name, args.clone()).to_string(),
            other => other.to_string(),
        };
        if input.expression == ctx.input_context().expression {
            call
        } else {
            format!("{}.{}", input.expression, call)
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
        planner::JoinGraph,
        schema::{ResolvedElementType, ResourceDefinitions},
    };

    #[test]
    fn test_subject_prefix_is_optional() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let short = ExpressionParser::parse("class.code", &mut ctx).unwrap();
        let long = ExpressionParser::parse("Encounter.class.code", &mut ctx).unwrap();
        assert_eq!(short.sql_expression, "Encounter.class.code");
        assert_eq!(short, long);
        assert_eq!(long.expression, "class.code");
    }

    #[test]
    fn test_literal_expression() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let result = ExpressionParser::parse("'AMB'", &mut ctx).unwrap();
        assert!(result.literal);
        assert_eq!(result.sql_expression, "'AMB'");
        assert_eq!(result.result_type_code, "string");

        let err = ExpressionParser::parse("'AMB'.code", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "Path traversal operator cannot be invoked on a literal value: 'AMB'");
    }

    #[test]
    fn test_syntax_error_carries_expression() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        match ExpressionParser::parse("class..code", &mut ctx).unwrap_err() {
            PlanError::Syntax { expression, error } => {
                assert_eq!(expression, "class..code");
                assert_eq!(error.message, "Expected identifier");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_function() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let err = ExpressionParser::parse("type.where(true)", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "Unrecognised function: where");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_other_resource_root() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let result = ExpressionParser::parse("Patient.gender", &mut ctx).unwrap();
        assert_eq!(result.sql_expression, "Patient.gender");
        assert_eq!(result.expression, "Patient.gender");
        assert_eq!(result.from_tables.iter().collect::<Vec<_>>(), vec!["Patient"]);
        assert_eq!(result.result_type, ResolvedElementType::Primitive);
    }

    #[test]
    fn test_element_identity_follows_functions() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Condition").unwrap();

        let detail = ExpressionParser::parse("evidence.detail", &mut ctx).unwrap();
        assert_eq!(detail.index_expression.as_deref(), Some("conditionEvidenceDetailIndex"));

        let resolved = ExpressionParser::parse("evidence.detail.resolve()", &mut ctx).unwrap();
        assert_eq!(resolved.eid_expression, detail.eid_expression);

        let count = ExpressionParser::parse("evidence.detail.resolve().count()", &mut ctx).unwrap();
        assert_eq!(count.eid_expression, None);
        assert_eq!(count.index_expression, None);
    }

    #[test]
    fn test_this_is_the_input_context() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter").unwrap();

        let this = ExpressionParser::parse("$this", &mut ctx).unwrap();
        assert_eq!(this, ctx.subject);
        let status = ExpressionParser::parse("$this.status", &mut ctx).unwrap();
        assert_eq!(status.sql_expression, "Encounter.status");
    }

    #[test]
    fn test_frame_is_evaluated_alongside_sql() {
        let defs = ResourceDefinitions::bundled().unwrap();
        let config = PlannerConfig::default();
        let functions = FunctionRegistry::default_function_registry();
        let mut joins = JoinGraph::new();
        let frame = Frame::from_resources(
            &[
                json!({ "id": "e1", "reasonCode": [ { "coding": [ { "code": "a" }, { "code": "b" } ] } ] }),
                json!({ "id": "e2", "reasonCode": [] }),
            ],
            "id",
        );
        let mut ctx = ParserContext::new(&defs, &config, &functions, &mut joins, "Encounter")
            .unwrap()
            .with_frame(frame);

        let codes = ExpressionParser::parse("reasonCode.coding.code", &mut ctx).unwrap();
        let frame = codes.frame.unwrap();
        assert_eq!(frame.values(), vec![&json!("a"), &json!("b"), &serde_json::Value::Null]);
        assert_eq!(frame.rows()[1].eid, Some(vec![0, 1, 0]));
        assert_eq!(frame.rows()[2].eid, None);
    }
}
