use crate::{
    error::PlanError,
    parser::{
        analyzer::{ParseResult, ParserContext},
        functions::{expect_no_arguments, FunctionInput, PathFunction},
    },
    schema::ResolvedElementType,
};

pub struct CountImpl;

impl PathFunction for CountImpl {
    fn name(&self) -> &'static str { "count" }

    fn invoke(&self, input: FunctionInput<'_>, ctx: &mut ParserContext<'_>) -> Result<ParseResult, PlanError> {
        expect_no_arguments(&input, self.name())?;

        let FunctionInput { input, expression, .. } = input;
        if input.literal {
            return Err(PlanError::invalid(
                &expression,
                format!("Count function cannot be invoked on a literal value: {}", input.expression),
            ));
        }

        // resources are counted by identity, elements by value
        let sql_expression = if input.is_resource() {
            format!("COUNT(DISTINCT {}.{})", input.sql_expression, ctx.config.id_column)
        } else {
            format!("COUNT({})", input.sql_expression)
        };

        Ok(ParseResult {
            expression,
            sql_expression,
            result_type: ResolvedElementType::Primitive,
            result_type_code: "unsignedInt".to_string(),
            definition: None,
            from_tables: input.from_tables,
            joins: input.joins,
            head_join: input.head_join,
            index_expression: None,
            eid_expression: None,
            singular: true,
            literal: false,
            frame: None,
        })
    }
}
