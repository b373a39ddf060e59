use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use tracing::debug;

use crate::{
    config::PlannerConfig,
    error::PlanError,
    planner::{ColumnRef, Join, JoinGraph, JoinId, JoinKind},
    utils::{path_to_upper_camel_case, tokenize_path},
};

/// Rewrites chains of lateral views that feed a table join.
///
/// A table join whose condition reads a column produced by exploding views
/// would multiply the rows of everything joined after it. Each such chain is
/// moved into an inline subquery keyed by the anchor's id, and the table join
/// is rewritten to read the column from that subquery instead.
pub struct LateralViewConsolidator;

#[derive(Default)]
struct ChainWalk {
    dependent: Option<JoinId>,
    pending: Vec<JoinId>,
}

impl LateralViewConsolidator {
    /// Consolidates `joins` within `graph`, returning the joins that remain.
    ///
    /// `pinned` joins root the SQL of a parsed expression and are never
    /// removed, even once their chain has been moved into a subquery.
    pub fn consolidate(
        graph: &mut JoinGraph,
        joins: &BTreeSet<JoinId>,
        pinned: &HashSet<JoinId>,
        config: &PlannerConfig,
    ) -> Result<BTreeSet<JoinId>, PlanError> {
        let mut live = joins.clone();

        loop {
            let mut changed = false;
            for head in Self::chain_heads(graph, &live) {
                if live.contains(&head) && Self::walk_chain(graph, &mut live, head, pinned, config)? {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        Ok(live)
    }

    /// Live joins no other live join depends upon, greatest rank first.
    fn chain_heads(graph: &JoinGraph, live: &BTreeSet<JoinId>) -> Vec<JoinId> {
        let depended: HashSet<JoinId> = live.iter().filter_map(|id| graph[*id].depends_upon).collect();
        let mut heads = graph.sorted(live.iter().filter(|id| !depended.contains(*id)));
        heads.reverse();
        heads
    }

    fn walk_chain(
        graph: &mut JoinGraph,
        live: &mut BTreeSet<JoinId>,
        head: JoinId,
        pinned: &HashSet<JoinId>,
        config: &PlannerConfig,
    ) -> Result<bool, PlanError> {
        let mut walk = ChainWalk::default();
        let mut changed = false;
        let mut cursor = Some(head);

        while let Some(id) = cursor {
            match graph[id].kind {
                JoinKind::TableJoin => {
                    if let Some(dependent) = walk.dependent.filter(|_| !walk.pending.is_empty()) {
                        changed |= Self::finalize(graph, live, dependent, &walk.pending, pinned, config)?;
                    }
                    walk = ChainWalk { dependent: Some(id), pending: vec![] };
                }
                JoinKind::LateralView => {
                    if walk.dependent.is_some() {
                        walk.pending.push(id);
                    }
                }
                JoinKind::InlineQuery => {
                    if let Some(dependent) = walk.dependent.filter(|_| !walk.pending.is_empty()) {
                        changed |= Self::finalize(graph, live, dependent, &walk.pending, pinned, config)?;
                    }
                    walk = ChainWalk::default();
                }
            }
            cursor = graph[id].depends_upon;
        }

        if let Some(dependent) = walk.dependent.filter(|_| !walk.pending.is_empty()) {
            changed |= Self::finalize(graph, live, dependent, &walk.pending, pinned, config)?;
        }

        Ok(changed)
    }

    /// Replaces `pending` views with one inline query feeding `dependent`.
    ///
    /// Returns `false`, leaving the chain in place, when any of its views is
    /// still read by the outer query: joining the subquery on the resource id
    /// alone would then pair every outer element with every inner one.
    fn finalize(
        graph: &mut JoinGraph,
        live: &mut BTreeSet<JoinId>,
        dependent: JoinId,
        pending: &[JoinId],
        pinned: &HashSet<JoinId>,
        config: &PlannerConfig,
    ) -> Result<bool, PlanError> {
        let views = graph.sorted(pending);
        let (first_view, last_view) = match (views.first(), views.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(PlanError::internal("No lateral views to consolidate")),
        };
        if Self::chain_is_shared(graph, live, &views, dependent, pinned) {
            debug!(dependent = %graph[dependent].alias, views = views.len(), "lateral views kept in outer query");
            return Ok(false);
        }

        let last = &graph[last_view];
        let fields = graph[dependent].fields_referenced_on(&last.alias);
        let field = match fields.as_slice() {
            [field] => field.to_string(),
            _ => {
                return Err(PlanError::internal(format!(
                    "Expected exactly one column of {} in join {}, found {}",
                    last.alias,
                    graph[dependent].alias,
                    fields.len()
                )));
            }
        };
        let consumed = ColumnRef::new(&last.alias, &field);
        let alias = format!("{}{}", last.alias, path_to_upper_camel_case(&tokenize_path(&field)));

        let anchor = graph[first_view].depends_upon;
        let (table, qualifier) = Self::anchor_table(graph, first_view, anchor)?;
        let from = if table == qualifier { table.clone() } else { format!("{} {}", table, qualifier) };
        let exploded: Vec<&str> = views.iter().map(|id| graph[*id].expression.as_str()).collect();

        let expression = format!(
            "INNER JOIN (SELECT {q}.{id}, {last}.{head} FROM {from} {views}) {alias} ON {q}.{id} = {alias}.{id}",
            q = qualifier,
            id = config.id_column,
            last = last.alias,
            head = consumed.head_field(),
            from = from,
            views = exploded.join(" "),
            alias = alias,
        );
        let references = vec![ColumnRef::new(&qualifier, &config.id_column), ColumnRef::new(&alias, &config.id_column)];
        let inline = Join::inline_query(expression, &alias, &last.root_expression, references).depending_upon(anchor);
        let rank = last.rank;
        let inline_id = graph.insert_with_rank(inline, rank);

        Self::redirect(graph, dependent, &consumed, &alias, inline_id)?;

        for id in &views {
            live.remove(id);
        }
        live.insert(inline_id);

        debug!(
            dependent = %graph[dependent].alias,
            inline = %alias,
            views = views.len(),
            "consolidated lateral views"
        );
        Ok(true)
    }

    /// Table and qualifier the subquery selects from.
    fn anchor_table(graph: &JoinGraph, first_view: JoinId, anchor: Option<JoinId>) -> Result<(String, String), PlanError> {
        match anchor.map(|id| &graph[id]) {
            None => {
                let udtf = graph[first_view].udtf_expression.as_deref().unwrap_or_default();
                let table = tokenize_path(udtf)
                    .first()
                    .map(|t| t.to_string())
                    .ok_or_else(|| PlanError::internal(format!("Lateral view {} has no source", graph[first_view].alias)))?;
                Ok((table.clone(), table))
            }
            Some(join) if join.kind == JoinKind::TableJoin => {
                let table = join
                    .table
                    .clone()
                    .ok_or_else(|| PlanError::internal(format!("Table join {} has no table", join.alias)))?;
                Ok((table, join.alias.clone()))
            }
            Some(join) => Err(PlanError::internal(format!(
                "Lateral view chain anchored on unsupported join {} ({:?})",
                join.alias, join.kind
            ))),
        }
    }

    /// Points `dependent` at the inline query, rewriting its reads of
    /// `consumed` to the inline query's alias.
    fn redirect(
        graph: &mut JoinGraph,
        dependent: JoinId,
        consumed: &ColumnRef,
        alias: &str,
        inline_id: JoinId,
    ) -> Result<(), PlanError> {
        let pattern = format!(r"(^|[^\w.]){}\.{}\b", regex::escape(&consumed.alias), regex::escape(&consumed.field));
        let column = Regex::new(&pattern).map_err(|e| PlanError::internal(e.to_string()))?;
        let replacement = format!("${{1}}{}.{}", alias, consumed.field);

        let join = graph
            .get_mut(dependent)
            .ok_or_else(|| PlanError::internal(format!("Unknown join {}", dependent)))?;
        join.expression = column.replace_all(&join.expression, replacement.as_str()).into_owned();
        for reference in join.references.iter_mut().filter(|r| *r == consumed) {
            reference.alias = alias.to_string();
        }
        join.depends_upon = Some(inline_id);
        Ok(())
    }

    /// Whether a view of the chain roots a parsed expression, or feeds a live
    /// join other than `dependent` and the chain itself.
    fn chain_is_shared(
        graph: &JoinGraph,
        live: &BTreeSet<JoinId>,
        views: &[JoinId],
        dependent: JoinId,
        pinned: &HashSet<JoinId>,
    ) -> bool {
        views.iter().any(|id| pinned.contains(id))
            || live
                .iter()
                .filter(|id| **id != dependent && !views.contains(*id))
                .any(|id| graph[*id].depends_upon.is_some_and(|upon| views.contains(&upon)))
    }
}
