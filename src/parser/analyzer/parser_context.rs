use crate::{
    config::PlannerConfig,
    error::PlanError,
    executor::Frame,
    parser::{analyzer::ParseResult, functions::FunctionRegistry},
    planner::JoinGraph,
    schema::SchemaProvider,
};

/// Everything an expression is parsed against.
///
/// The join graph is shared by every expression of one query, so equal joins
/// discovered by different expressions collapse into one.
pub struct ParserContext<'a> {
    pub schema: &'a dyn SchemaProvider,
    pub config: &'a PlannerConfig,
    pub functions: &'a FunctionRegistry,
    pub joins: &'a mut JoinGraph,
    /// Root of the subject resource; unqualified paths start here.
    pub subject: ParseResult,
    /// `$this` binding, when parsing inside a function argument.
    pub this: Option<ParseResult>,
}

impl<'a> ParserContext<'a> {
    pub fn new(
        schema: &'a dyn SchemaProvider,
        config: &'a PlannerConfig,
        functions: &'a FunctionRegistry,
        joins: &'a mut JoinGraph,
        subject_resource: &str,
    ) -> Result<Self, PlanError> {
        let subject = Self::resource_root(schema, subject_resource)
            .ok_or_else(|| PlanError::invalid(subject_resource, format!("Unknown resource type: {}", subject_resource)))?;
        Ok(Self { schema, config, functions, joins, subject, this: None })
    }

    /// Attaches rows to the subject so parsing also evaluates paths over data.
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.subject.frame = Some(frame);
        self
    }

    pub fn resource_root(schema: &dyn SchemaProvider, resource_type: &str) -> Option<ParseResult> {
        let definition = schema.resource_definition(resource_type)?;
        Some(ParseResult::resource(resource_type, definition))
    }

    /// The result an unqualified path is evaluated against.
    pub fn input_context(&self) -> &ParseResult {
        self.this.as_ref().unwrap_or(&self.subject)
    }

    /// A context over another subject resource sharing this one's joins.
    pub fn for_subject(&mut self, resource_type: &str) -> Result<ParserContext<'_>, PlanError> {
        ParserContext::new(self.schema, self.config, self.functions, &mut *self.joins, resource_type)
    }
}
