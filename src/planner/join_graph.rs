use std::ops::Index;

use tracing::trace;

use crate::planner::{Join, JoinId};

/// Arena of joins discovered while compiling one query.
///
/// Joins are addressed by `JoinId` and ordered by rank, which follows
/// discovery order. Inserting a join equal to one already present returns the
/// existing id, so every distinct join appears exactly once.
#[derive(Debug, Clone, Default)]
pub struct JoinGraph {
    joins: Vec<Join>,
    next_rank: u64,
}

impl JoinGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, join: Join) -> JoinId {
        if let Some(existing) = self.find(&join) {
            return existing;
        }
        let rank = self.next_rank;
        self.next_rank += 1;
        self.insert_with_rank(join, rank)
    }

    /// Inserts with an explicit rank, for joins that take over the position of
    /// the joins they replace.
    pub(crate) fn insert_with_rank(&mut self, mut join: Join, rank: u64) -> JoinId {
        if let Some(existing) = self.find(&join) {
            return existing;
        }
        let id = JoinId(self.joins.len());
        join.id = id;
        join.rank = rank;
        trace!(%id, rank, alias = %join.alias, kind = ?join.kind, "registered join");
        self.joins.push(join);
        id
    }

    pub fn find(&self, join: &Join) -> Option<JoinId> {
        self.joins.iter().find(|j| *j == join).map(|j| j.id)
    }

    pub fn get(&self, id: JoinId) -> Option<&Join> {
        self.joins.get(id.0)
    }

    pub fn get_mut(&mut self, id: JoinId) -> Option<&mut Join> {
        self.joins.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    pub fn rank(&self, id: JoinId) -> Option<u64> {
        self.get(id).map(|j| j.rank)
    }

    /// The given ids ordered by rank, duplicates removed.
    pub fn sorted<'a>(&self, ids: impl IntoIterator<Item = &'a JoinId>) -> Vec<JoinId> {
        let mut sorted: Vec<JoinId> = ids.into_iter().copied().filter(|id| self.get(*id).is_some()).collect();
        sorted.sort_by_key(|id| self.joins[id.0].rank);
        sorted.dedup();
        sorted
    }

    /// `id` followed by every join it transitively depends upon.
    pub fn dependency_chain(&self, id: JoinId) -> Vec<JoinId> {
        let mut chain = vec![];
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if chain.contains(&current) {
                break;
            }
            match self.get(current) {
                Some(join) => {
                    chain.push(current);
                    cursor = join.depends_upon;
                }
                None => break,
            }
        }
        chain
    }
}

impl Index<JoinId> for JoinGraph {
    type Output = Join;

    fn index(&self, id: JoinId) -> &Join {
        &self.joins[id.0]
    }
}
