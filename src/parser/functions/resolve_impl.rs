use tracing::trace;

use crate::{
    error::PlanError,
    parser::{
        analyzer::{ParseResult, ParserContext},
        functions::{expect_no_arguments, FunctionInput, PathFunction},
    },
    planner::Join,
    schema::ResolvedElementType,
    utils::{path_to_lower_camel_case, tokenize_path},
};

/// `resolve()`: follows a `Reference` element to the resource it points at.
///
/// Emits `LEFT JOIN <Target> <alias> ON <ref>.reference = concat('<Target>/', <alias>.id)`.
pub struct ResolveImpl;

impl PathFunction for ResolveImpl {
    fn name(&self) -> &'static str { "resolve" }

    fn invoke(&self, input: FunctionInput<'_>, ctx: &mut ParserContext<'_>) -> Result<ParseResult, PlanError> {
        expect_no_arguments(&input, self.name())?;

        let FunctionInput { input, expression, .. } = input;
        if input.result_type != ResolvedElementType::Reference {
            return Err(PlanError::invalid(
                &expression,
                format!("Input to resolve function must be a Reference: {}", input.expression),
            ));
        }

        let targets = input.definition.as_ref().map(|d| d.targets.as_slice()).unwrap_or_default();
        let target = match targets {
            [target] => target.clone(),
            _ => {
                return Err(PlanError::invalid(
                    &expression,
                    format!("Resolve function requires a reference with exactly one target type: {}", input.expression),
                ));
            }
        };
        let definition = ctx
            .schema
            .resource_definition(&target)
            .ok_or_else(|| PlanError::invalid(&expression, format!("Unknown resource type: {}", target)))?;

        let mut alias_parts = tokenize_path(&input.sql_expression);
        alias_parts.push(&target);
        let alias = path_to_lower_camel_case(&alias_parts);

        let reference = input.column_ref(&ctx.config.reference_field);
        let on = format!("{} = concat('{}/', {}.{})", reference, target, alias, ctx.config.id_column);
        let join = Join::table_join(&target, &alias, &on, &expression, vec![reference]).depending_upon(input.head_join);
        let id = ctx.joins.insert(join);
        trace!(%id, %alias, resource = %target, "resolved reference");

        let mut from_tables = input.from_tables;
        from_tables.insert(target.clone());
        let mut joins = input.joins;
        joins.insert(id);

        Ok(ParseResult {
            expression,
            sql_expression: alias,
            result_type: ResolvedElementType::Resource,
            result_type_code: target,
            definition: Some(definition),
            from_tables,
            joins,
            head_join: Some(id),
            index_expression: input.index_expression,
            eid_expression: input.eid_expression,
            singular: input.singular,
            literal: false,
            frame: None,
        })
    }
}
