use std::collections::{BTreeSet, HashSet};

use indexmap::IndexSet;
use tracing::debug;

use crate::{
    config::PlannerConfig,
    error::PlanError,
    parser::{
        analyzer::{ExpressionParser, ParseResult, ParserContext},
        functions::FunctionRegistry,
    },
    planner::{AggregateQuery, JoinGraph, JoinId, LateralViewConsolidator, QueryComponent, QueryPlan},
    schema::{ResolvedElementType, SchemaProvider},
};

/// Compiles aggregate queries into `QueryPlan`s against one schema.
///
/// A builder holds no per-query state: every call owns a fresh join graph,
/// so one builder may serve any number of queries.
pub struct PlanBuilder<'a> {
    schema: &'a dyn SchemaProvider,
    config: PlannerConfig,
    functions: FunctionRegistry,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(schema: &'a dyn SchemaProvider) -> Self {
        Self {
            schema,
            config: PlannerConfig::default(),
            functions: FunctionRegistry::default_function_registry(),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn build_query_plan(&self, query: &AggregateQuery) -> Result<QueryPlan, PlanError> {
        if query.aggregations.is_empty() {
            return Err(PlanError::EmptyAggregation);
        }
        let aggregations = Self::expressions(&query.aggregations, "Aggregation")?;
        let groupings = Self::expressions(&query.groupings, "Grouping")?;

        self.build(&query.subject_resource, &aggregations, &groupings)
    }

    /// Builds a plan straight from expression text.
    pub fn build(&self, subject_resource: &str, aggregations: &[&str], groupings: &[&str]) -> Result<QueryPlan, PlanError> {
        if aggregations.is_empty() {
            return Err(PlanError::EmptyAggregation);
        }

        let mut graph = JoinGraph::new();
        let (aggregation_results, grouping_results) = {
            let mut ctx = ParserContext::new(self.schema, &self.config, &self.functions, &mut graph, subject_resource)?;
            let aggregation_results = Self::parse_all(aggregations, &mut ctx)?;
            let grouping_results = Self::parse_all(groupings, &mut ctx)?;
            (aggregation_results, grouping_results)
        };

        Self::validate_groupings(&aggregation_results, &grouping_results)?;

        let results = || aggregation_results.iter().chain(grouping_results.iter());
        let joins: BTreeSet<JoinId> = results().flat_map(|r| r.joins.iter().copied()).collect();
        let pinned: HashSet<JoinId> = results().filter_map(|r| r.head_join).collect();
        let live = LateralViewConsolidator::consolidate(&mut graph, &joins, &pinned, &self.config)?;

        let mut from_tables = IndexSet::new();
        for result in results() {
            from_tables.extend(result.from_tables.iter().cloned());
        }

        let plan = QueryPlan {
            aggregations: aggregation_results.iter().map(|r| r.sql_expression.clone()).collect(),
            aggregation_types: aggregation_results.iter().map(|r| r.result_type_code.clone()).collect(),
            groupings: grouping_results.iter().map(|r| r.sql_expression.clone()).collect(),
            grouping_types: grouping_results.iter().map(|r| r.result_type_code.clone()).collect(),
            from_tables,
            joins: graph.sorted(&live).into_iter().map(|id| graph[id].clone()).collect(),
        };
        debug!(
            subject = subject_resource,
            aggregations = plan.aggregations.len(),
            groupings = plan.groupings.len(),
            joins = plan.joins.len(),
            "built query plan"
        );
        Ok(plan)
    }

    fn expressions<'q>(components: &'q [QueryComponent], kind: &'static str) -> Result<Vec<&'q str>, PlanError> {
        components
            .iter()
            .map(|c| c.expression.as_deref().ok_or(PlanError::MissingExpression { component: kind }))
            .collect()
    }

    fn parse_all(expressions: &[&str], ctx: &mut ParserContext) -> Result<Vec<ParseResult>, PlanError> {
        expressions.iter().map(|text| ExpressionParser::parse(text, ctx)).collect()
    }

    fn validate_groupings(aggregations: &[ParseResult], groupings: &[ParseResult]) -> Result<(), PlanError> {
        for grouping in groupings {
            if grouping.result_type != ResolvedElementType::Primitive {
                return Err(PlanError::NonPrimitiveGrouping {
                    expression: grouping.expression.clone(),
                    type_code: grouping.result_type_code.clone(),
                });
            }
        }

        let aggregation_tables: HashSet<&str> = aggregations
            .iter()
            .flat_map(|r| r.from_tables.iter().map(String::as_str))
            .collect();
        let mut extra: Vec<String> = groupings
            .iter()
            .flat_map(|r| r.from_tables.iter())
            .filter(|t| !aggregation_tables.contains(t.as_str()))
            .cloned()
            .collect::<IndexSet<String>>()
            .into_iter()
            .collect();
        if !extra.is_empty() {
            extra.sort();
            return Err(PlanError::UnreferencedGroupingTables(extra));
        }
        Ok(())
    }
}
