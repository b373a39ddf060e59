use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::Serialize;

use crate::utils::tokenize_path;

/// Opaque handle of a join within its `JoinGraph`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct JoinId(pub(crate) usize);

impl fmt::Display for JoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "j{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinKind {
    /// Join against another resource table.
    TableJoin,
    /// Explode of a repeating field into one row per element.
    LateralView,
    /// Self-contained subquery joined back by resource identity.
    InlineQuery,
}

/// A column a join expression reads, as `alias.field`.
///
/// `field` may itself be a dotted path (`subject.reference`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRef {
    pub alias: String,
    pub field: String,
}

impl ColumnRef {
    pub fn new(alias: impl Into<String>, field: impl Into<String>) -> Self {
        Self { alias: alias.into(), field: field.into() }
    }

    /// First segment of the field path, the column a subquery must select.
    pub fn head_field(&self) -> &str {
        tokenize_path(&self.field).first().copied().unwrap_or(self.field.as_str())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.field)
    }
}

/// One node of the join dependency graph.
///
/// Two joins are equal when their alias and expression are equal; the id,
/// rank and dependency are bookkeeping owned by the graph.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    pub id: JoinId,
    pub kind: JoinKind,
    pub expression: String,
    pub alias: String,
    pub root_expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udtf_expression: Option<String>,
    /// Table joined in by a `TableJoin`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip)]
    pub references: Vec<ColumnRef>,
    pub depends_upon: Option<JoinId>,
    #[serde(skip)]
    pub(crate) rank: u64,
}

impl Join {
    fn new(kind: JoinKind, expression: String, alias: &str, root_expression: &str) -> Self {
        Self {
            id: JoinId::default(),
            kind,
            expression,
            alias: alias.to_string(),
            root_expression: root_expression.to_string(),
            udtf_expression: None,
            table: None,
            references: vec![],
            depends_upon: None,
            rank: 0,
        }
    }

    /// Outer, position-preserving explode of `udtf_expression`.
    ///
    /// An empty or absent collection still yields one row, with NULL position
    /// and value, so the parent row is never dropped.
    pub fn lateral_view(udtf_expression: &str, alias: &str, root_expression: &str) -> Self {
        let expression = format!(
            "LATERAL VIEW OUTER posexplode({}) {} AS {}, {}",
            udtf_expression,
            alias,
            Self::position_column(alias),
            alias
        );
        let mut join = Self::new(JoinKind::LateralView, expression, alias, root_expression);
        join.udtf_expression = Some(udtf_expression.to_string());
        join
    }

    /// Column holding the element position produced by the view `alias`.
    pub fn position_column(alias: &str) -> String {
        format!("{}Index", alias)
    }

    pub fn table_join(table: &str, alias: &str, on: &str, root_expression: &str, references: Vec<ColumnRef>) -> Self {
        let expression = format!("LEFT JOIN {} {} ON {}", table, alias, on);
        let mut join = Self::new(JoinKind::TableJoin, expression, alias, root_expression);
        join.table = Some(table.to_string());
        join.references = references;
        join
    }

    pub fn inline_query(expression: String, alias: &str, root_expression: &str, references: Vec<ColumnRef>) -> Self {
        let mut join = Self::new(JoinKind::InlineQuery, expression, alias, root_expression);
        join.references = references;
        join
    }

    pub fn depending_upon(mut self, depends_upon: Option<JoinId>) -> Self {
        self.depends_upon = depends_upon;
        self
    }

    /// Distinct fields of `alias` that this join's expression reads.
    pub fn fields_referenced_on(&self, alias: &str) -> Vec<&str> {
        let mut fields: Vec<&str> = vec![];
        for reference in self.references.iter().filter(|r| r.alias == alias) {
            if !fields.contains(&reference.field.as_str()) {
                fields.push(&reference.field);
            }
        }
        fields
    }
}

impl PartialEq for Join {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias && self.expression == other.expression
    }
}

impl Eq for Join {}

impl Hash for Join {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias.hash(state);
        self.expression.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lateral_view_expression() {
        let join = Join::lateral_view("Encounter.reasonCode", "encounterReasonCode", "reasonCode");
        assert_eq!(join.kind, JoinKind::LateralView);
        assert_eq!(
            join.expression,
            "LATERAL VIEW OUTER posexplode(Encounter.reasonCode) encounterReasonCode AS encounterReasonCodeIndex, encounterReasonCode"
        );
        assert_eq!(join.udtf_expression.as_deref(), Some("Encounter.reasonCode"));
        assert_eq!(Join::position_column(&join.alias), "encounterReasonCodeIndex");
    }

    #[test]
    fn test_equality_ignores_bookkeeping() {
        let a = Join::lateral_view("Encounter.type", "encounterType", "type")
            .depending_upon(Some(JoinId(3)));
        let mut b = Join::lateral_view("Encounter.type", "encounterType", "other.root");
        b.rank = 42;
        assert_eq!(a, b);

        let c = Join::lateral_view("Encounter.type", "encounterKind", "type");
        assert_ne!(a, c);
    }

    #[test]
    fn test_fields_referenced_on_alias_are_distinct() {
        let join = Join::table_join(
            "Patient",
            "x",
            "v.subject.reference = concat('Patient/', x.id)",
            "subject.resolve()",
            vec![
                ColumnRef::new("v", "subject.reference"),
                ColumnRef::new("v", "subject.reference"),
                ColumnRef::new("w", "id"),
            ],
        );
        assert_eq!(join.fields_referenced_on("v"), vec!["subject.reference"]);
        assert_eq!(join.fields_referenced_on("w"), vec!["id"]);
        assert!(join.fields_referenced_on("z").is_empty());
    }

    #[test]
    fn test_column_ref_head_field() {
        let r = ColumnRef::new("v", "subject.reference");
        assert_eq!(r.head_field(), "subject");
        assert_eq!(r.to_string(), "v.subject.reference");
    }
}
