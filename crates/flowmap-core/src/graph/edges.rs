//! Ordered-pair edge deduplication.
//!
//! Upstream adjacency is recorded on both endpoints (`A.successors` holds `B`
//! and `B.predecessors` holds `A`), so every edge is usually emitted twice.
//! [`EdgeSet`] keeps one edge per `(from, to)` pair. When two emissions
//! disagree on the relation, the one with the higher [`Relation::rank`]
//! survives; equal ranks keep the first.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::infer::Relation;
use crate::model::MapEdge;

/// Deduplicating edge accumulator keyed by ordered pair.
#[derive(Debug, Default)]
pub struct EdgeSet {
    edges: BTreeMap<(String, String), Relation>,
}

impl EdgeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `from → to`, keeping the highest-ranked relation seen so far.
    pub fn insert(&mut self, from: String, to: String, relation: Relation) {
        match self.edges.entry((from, to)) {
            Entry::Vacant(slot) => {
                slot.insert(relation);
            }
            Entry::Occupied(mut slot) => {
                if relation.rank() > slot.get().rank() {
                    slot.insert(relation);
                }
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Consume the set, yielding edges sorted by `(from, to, relation)`.
    #[must_use]
    pub fn into_sorted_edges(self) -> Vec<MapEdge> {
        // BTreeMap order is already (from, to); pairs are unique so the
        // relation never participates in the ordering.
        self.edges
            .into_iter()
            .map(|((from, to), relation)| MapEdge { from, to, relation })
            .collect()
    }
}
