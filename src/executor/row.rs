use serde::Serialize;
use serde_json::Value;

/// One row of a traversal frame.
///
/// `id` identifies the resource the row came from, `eid` the path of element
/// positions taken from the resource root to reach `value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: Value,
    pub eid: Option<Vec<usize>>,
    pub index: Option<usize>,
    pub value: Value,
}

impl Row {
    pub fn root(id: Value, value: Value) -> Self {
        Self { id, eid: Some(vec![]), index: None, value }
    }

    /// A row one step below this one, at `index` (or nowhere, when `None`).
    pub fn child(&self, index: Option<usize>, value: Value) -> Self {
        let eid = match (&self.eid, index) {
            (Some(eid), Some(index)) => {
                let mut next = eid.clone();
                next.push(index);
                Some(next)
            }
            _ => None,
        };
        Self { id: self.id.clone(), eid, index, value }
    }

    pub fn field(&self, name: &str) -> Value {
        self.value.get(name).cloned().unwrap_or(Value::Null)
    }
}
