use std::collections::HashSet;

use indexmap::IndexSet;
use serde::Serialize;

use crate::planner::{Join, JoinKind};

/// The relational plan of one aggregate query.
///
/// Expressions and their FHIR type codes are kept in input order; joins are
/// ordered so that every join comes after the join it depends upon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPlan {
    pub aggregations: Vec<String>,
    pub aggregation_types: Vec<String>,
    pub groupings: Vec<String>,
    pub grouping_types: Vec<String>,
    pub from_tables: IndexSet<String>,
    pub joins: Vec<Join>,
}

impl QueryPlan {
    /// Base tables the query selects from: those not already brought in by a
    /// table join.
    pub fn base_tables(&self) -> Vec<&str> {
        let joined: HashSet<&str> = self
            .joins
            .iter()
            .filter(|j| j.kind == JoinKind::TableJoin)
            .filter_map(|j| j.table.as_deref())
            .collect();

        let base: Vec<&str> = self
            .from_tables
            .iter()
            .map(String::as_str)
            .filter(|t| !joined.contains(t))
            .collect();
        if base.is_empty() {
            return self.from_tables.first().map(String::as_str).into_iter().collect();
        }
        base
    }

    /// Renders the plan as a single Spark SQL statement.
    pub fn to_sql(&self) -> String {
        let columns: Vec<&str> = self
            .groupings
            .iter()
            .chain(self.aggregations.iter())
            .map(String::as_str)
            .collect();

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), self.base_tables().join(", "));
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.expression);
        }
        if !self.groupings.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.groupings.join(", "));
        }
        sql
    }
}
