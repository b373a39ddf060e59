use crate::{
    error::PlanError,
    parser::{
        analyzer::{ParseResult, ParserContext},
        ast::PathExpr,
    },
};

/// The target and arguments of one function invocation.
pub struct FunctionInput<'e> {
    /// Result the function is invoked on.
    pub input: ParseResult,
    /// Unparsed arguments; each function decides how they are evaluated.
    pub args: &'e [PathExpr],
    /// Path text of the whole invocation.
    pub expression: String,
}

/// A function callable from a path expression.
/// Implementations are stateless and shared by every compilation.
pub trait PathFunction: Send + Sync {
    /// Name as written in expressions ("count", "resolve", ...).
    fn name(&self) -> &'static str;

    fn invoke(&self, input: FunctionInput<'_>, ctx: &mut ParserContext<'_>) -> Result<ParseResult, PlanError>;
}

/// Rejects invocations that pass arguments to a function taking none.
pub(crate) fn expect_no_arguments(input: &FunctionInput<'_>, name: &str) -> Result<(), PlanError> {
    if input.args.is_empty() {
        return Ok(());
    }
    Err(PlanError::invalid(
        &input.expression,
        format!("Arguments can not be passed to {} function: {}", name, input.expression),
    ))
}
