use tracing::trace;

use crate::{
    error::PlanError,
    parser::{
        analyzer::{ExpressionParser, ParseResult, ParserContext},
        functions::{FunctionInput, PathFunction},
    },
    planner::{ColumnRef, Join},
    schema::ResolvedElementType,
    utils::{path_to_lower_camel_case, tokenize_path},
};

/// `reverseResolve(<Resource>.<field>)`: the resources whose `field` refers
/// back to the input resource.
pub struct ReverseResolveImpl;

impl PathFunction for ReverseResolveImpl {
    fn name(&self) -> &'static str { "reverseResolve" }

    fn invoke(&self, input: FunctionInput<'_>, ctx: &mut ParserContext<'_>) -> Result<ParseResult, PlanError> {
        let FunctionInput { input, args, expression } = input;

        let arg = match args {
            [arg] => arg,
            _ => {
                return Err(PlanError::invalid(
                    &expression,
                    format!("reverseResolve function accepts a single argument: {}", expression),
                ));
            }
        };
        if !input.is_resource() {
            return Err(PlanError::invalid(
                &expression,
                format!("Input to reverseResolve function must be a Resource: {}", input.expression),
            ));
        }

        let referrer = arg
            .root_identifier()
            .filter(|name| ctx.schema.is_resource_type(name))
            .map(str::to_string)
            .ok_or_else(|| {
                PlanError::invalid(
                    &expression,
                    format!("Argument to reverseResolve function must start with a resource type: {}", arg),
                )
            })?;

        let argument = {
            let mut referrer_ctx = ctx.for_subject(&referrer)?;
            ExpressionParser::evaluate(arg, &mut referrer_ctx)?
        };
        if argument.result_type != ResolvedElementType::Reference || !argument.singular || !argument.joins.is_empty() {
            return Err(PlanError::invalid(
                &expression,
                format!("Argument to reverseResolve function must be a singular Reference element: {}", arg),
            ));
        }
        let targets_input = argument
            .definition
            .as_ref()
            .is_some_and(|d| d.targets.contains(&input.result_type_code));
        if !targets_input {
            return Err(PlanError::invalid(
                &expression,
                format!(
                    "Reference in argument to reverseResolve does not support input resource type: {}",
                    expression
                ),
            ));
        }
        let definition = ctx
            .schema
            .resource_definition(&referrer)
            .ok_or_else(|| PlanError::invalid(&expression, format!("Unknown resource type: {}", referrer)))?;

        let mut alias_parts = tokenize_path(&input.sql_expression);
        alias_parts.extend(tokenize_path(&argument.sql_expression));
        let alias = path_to_lower_camel_case(&alias_parts);

        let identity = input.column_ref(&ctx.config.id_column);
        let referring = ColumnRef::new(&alias, argument.column_ref(&ctx.config.reference_field).field);
        let on = format!("concat('{}/', {}) = {}", input.result_type_code, identity, referring);
        let join = Join::table_join(&referrer, &alias, &on, &expression, vec![identity]).depending_upon(input.head_join);
        let id = ctx.joins.insert(join);
        trace!(%id, %alias, referrer = %referrer, "reverse resolved reference");

        let mut from_tables = input.from_tables;
        from_tables.insert(referrer.clone());
        let mut joins = input.joins;
        joins.insert(id);

        Ok(ParseResult {
            expression,
            sql_expression: alias,
            result_type: ResolvedElementType::Resource,
            result_type_code: referrer,
            definition: Some(definition),
            from_tables,
            joins,
            head_join: Some(id),
            index_expression: None,
            eid_expression: None,
            singular: false,
            literal: false,
            frame: None,
        })
    }
}
