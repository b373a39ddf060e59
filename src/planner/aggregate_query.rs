use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// One labelled aggregation or grouping of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
}

impl QueryComponent {
    pub fn new(expression: &str) -> Self {
        Self { label: None, expression: Some(expression.to_string()) }
    }

    pub fn labelled(label: &str, expression: &str) -> Self {
        Self { label: Some(label.to_string()), expression: Some(expression.to_string()) }
    }
}

/// An aggregate request: aggregations over a subject resource, optionally
/// broken down by groupings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateQuery {
    pub subject_resource: String,
    #[serde(default)]
    pub aggregations: Vec<QueryComponent>,
    #[serde(default)]
    pub groupings: Vec<QueryComponent>,
}

impl AggregateQuery {
    pub fn new(subject_resource: &str) -> Self {
        Self { subject_resource: subject_resource.to_string(), ..Default::default() }
    }

    pub fn with_aggregation(mut self, expression: &str) -> Self {
        self.aggregations.push(QueryComponent::new(expression));
        self
    }

    pub fn with_grouping(mut self, expression: &str) -> Self {
        self.groupings.push(QueryComponent::new(expression));
        self
    }

    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults_missing_lists() {
        let query = AggregateQuery::from_json(
            r#"{ "subjectResource": "Encounter", "aggregations": [ { "label": "Number of encounters", "expression": "count()" } ] }"#,
        )
        .unwrap();
        assert_eq!(query.subject_resource, "Encounter");
        assert_eq!(query.aggregations, vec![QueryComponent::labelled("Number of encounters", "count()")]);
        assert!(query.groupings.is_empty());
    }

    #[test]
    fn test_component_without_expression_parses() {
        let query = AggregateQuery::from_json(
            r#"{ "subjectResource": "Encounter", "aggregations": [ { "label": "empty" } ] }"#,
        )
        .unwrap();
        assert_eq!(query.aggregations[0].expression, None);
    }

    #[test]
    fn test_builder() {
        let query = AggregateQuery::new("Encounter")
            .with_aggregation("count()")
            .with_grouping("class.code");
        assert_eq!(query.aggregations.len(), 1);
        assert_eq!(query.groupings[0].expression.as_deref(), Some("class.code"));
    }
}
