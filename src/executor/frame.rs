use serde::Serialize;
use serde_json::Value;

use crate::{executor::Row, schema::Cardinality};

/// In-memory rows a path expression evaluates to, one per element reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    rows: Vec<Row>,
}

impl Frame {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// One root row per JSON resource, identified by its `id_column` value.
    pub fn from_resources(resources: &[Value], id_column: &str) -> Self {
        let rows = resources
            .iter()
            .map(|resource| {
                let id = resource.get(id_column).cloned().unwrap_or(Value::Null);
                Row::root(id, resource.clone())
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn values(&self) -> Vec<&Value> {
        self.rows.iter().map(|r| &r.value).collect()
    }

    /// Advances every row to its child `field`.
    ///
    /// Singular fields keep one row per input row. Repeating fields are
    /// exploded outer and position-preserving: one row per element, or a
    /// single null row when the collection is null, absent or empty.
    pub fn traverse(&self, field: &str, max: Cardinality) -> Frame {
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let value = row.field(field);
            match max {
                Cardinality::One => {
                    let index = if value.is_null() { None } else { Some(0) };
                    rows.push(row.child(index, value));
                }
                Cardinality::Many => match value {
                    Value::Array(elements) if !elements.is_empty() => {
                        for (position, element) in elements.into_iter().enumerate() {
                            rows.push(row.child(Some(position), element));
                        }
                    }
                    Value::Array(_) | Value::Null => rows.push(row.child(None, Value::Null)),
                    scalar => rows.push(row.child(Some(0), scalar)),
                },
            }
        }
        Frame { rows }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn encounters() -> Frame {
        Frame::from_resources(
            &[
                json!({ "id": "e1", "class": { "code": "AMB" }, "reasonCode": [ { "text": "a" }, { "text": "b" }, { "text": "c" } ] }),
                json!({ "id": "e2", "reasonCode": [] }),
                json!({ "id": "e3", "class": { "code": "IMP" } }),
            ],
            "id",
        )
    }

    #[test]
    fn test_singular_traversal_preserves_row_count() {
        let frame = encounters();
        let class = frame.traverse("class", Cardinality::One);
        assert_eq!(class.len(), frame.len());

        let indexes: Vec<_> = class.rows().iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![Some(0), None, Some(0)]);
        assert_eq!(class.rows()[0].eid, Some(vec![0]));
        assert_eq!(class.rows()[1].eid, None);
        assert_eq!(class.rows()[1].value, Value::Null);
    }

    #[test]
    fn test_repeating_traversal_explodes_with_positions() {
        let reasons = encounters().traverse("reasonCode", Cardinality::Many);
        let e1: Vec<_> = reasons.rows().iter().filter(|r| r.id == json!("e1")).collect();
        assert_eq!(e1.len(), 3);
        assert_eq!(e1.iter().map(|r| r.index).collect::<Vec<_>>(), vec![Some(0), Some(1), Some(2)]);
        assert_eq!(e1.iter().map(|r| r.value["text"].clone()).collect::<Vec<_>>(), vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(e1[2].eid, Some(vec![2]));
    }

    #[test]
    fn test_empty_and_absent_collections_keep_one_null_row() {
        let reasons = encounters().traverse("reasonCode", Cardinality::Many);
        assert_eq!(reasons.len(), 5);
        for id in ["e2", "e3"] {
            let rows: Vec<_> = reasons.rows().iter().filter(|r| r.id == json!(id)).collect();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].index, None);
            assert_eq!(rows[0].eid, None);
            assert_eq!(rows[0].value, Value::Null);
        }
    }

    #[test]
    fn test_nested_traversal_concatenates_eid() {
        let frame = Frame::from_resources(
            &[json!({ "id": "p1", "name": [ { "given": ["Ann", "Marie"] }, { "given": ["Annie"] } ] })],
            "id",
        );
        let given = frame
            .traverse("name", Cardinality::Many)
            .traverse("given", Cardinality::Many);
        let eids: Vec<_> = given.rows().iter().map(|r| r.eid.clone()).collect();
        assert_eq!(eids, vec![Some(vec![0, 0]), Some(vec![0, 1]), Some(vec![1, 0])]);
        assert_eq!(given.values(), vec![&json!("Ann"), &json!("Marie"), &json!("Annie")]);
    }

    #[test]
    fn test_null_row_stays_null_through_further_steps() {
        let frame = Frame::from_resources(&[json!({ "id": "e1" })], "id");
        let coding = frame
            .traverse("reasonCode", Cardinality::Many)
            .traverse("coding", Cardinality::Many)
            .traverse("code", Cardinality::One);
        assert_eq!(coding.len(), 1);
        assert_eq!(coding.rows()[0].eid, None);
        assert_eq!(coding.rows()[0].value, Value::Null);
    }

    #[test]
    fn test_traversal_leaves_input_untouched() {
        let frame = encounters();
        let before = frame.clone();
        let _ = frame.traverse("reasonCode", Cardinality::Many);
        assert_eq!(frame, before);
    }
}
