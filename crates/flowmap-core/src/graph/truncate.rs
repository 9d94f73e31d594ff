//! Bounding a normalized map for transport.
//!
//! # Procedure
//!
//! 1. Keep the first `max_nodes` nodes of the (already id-sorted) node list.
//! 2. Drop every edge with an endpoint outside the kept node set.
//! 3. Keep the first `max_edges` of the remaining (already sorted) edges.
//! 4. Re-derive roots, leaves, and stats from what survived.
//!
//! Step 2 can remove edges that `max_edges` alone would have kept. The result
//! must never reference a node it does not contain.
//!
//! Derived data is never carried over from the input map: a node that loses
//! its only inbound edge becomes a root of the truncated view.

use tracing::{debug, instrument};

use crate::graph::stats::Derived;
use crate::model::{MapEdge, NormalizedMap, TruncatedMap, TruncationSummary};

/// Upper bounds applied by [`truncate`]. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TruncationCaps {
    pub max_nodes: Option<usize>,
    pub max_edges: Option<usize>,
}

impl TruncationCaps {
    #[must_use]
    pub const fn new(max_nodes: Option<usize>, max_edges: Option<usize>) -> Self {
        Self {
            max_nodes,
            max_edges,
        }
    }

    /// No bounds at all; [`truncate`] returns the map unchanged.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(None, None)
    }
}

/// Bound `map` by `caps`, keeping the result edge-consistent.
///
/// The input warnings are preserved; one more is appended when anything was
/// actually cut.
#[instrument(skip(map), fields(project_key = %map.project_key))]
#[must_use]
pub fn truncate(map: &NormalizedMap, caps: TruncationCaps) -> TruncatedMap {
    let node_count_before = map.nodes.len();
    let edge_count_before = map.edges.len();

    let node_limit = caps.max_nodes.unwrap_or(usize::MAX);
    let nodes: Vec<_> = map.nodes.iter().take(node_limit).cloned().collect();

    let edges: Vec<MapEdge> = {
        // Node ids are sorted, so membership is a binary search.
        let contains = |id: &str| nodes.binary_search_by(|n| n.id.as_str().cmp(id)).is_ok();
        let edge_limit = caps.max_edges.unwrap_or(usize::MAX);
        map.edges
            .iter()
            .filter(|e| contains(&e.from) && contains(&e.to))
            .take(edge_limit)
            .cloned()
            .collect()
    };

    let derived = Derived::compute(&nodes, &edges);

    let summary = TruncationSummary {
        truncated: nodes.len() < node_count_before || edges.len() < edge_count_before,
        max_nodes: caps.max_nodes,
        max_edges: caps.max_edges,
        node_count_before,
        node_count_after: nodes.len(),
        edge_count_before,
        edge_count_after: edges.len(),
    };

    let mut warnings = map.warnings.clone();
    if summary.truncated {
        warnings.push(format!(
            "Map truncated: kept {} of {} nodes and {} of {} edges.",
            summary.node_count_after,
            summary.node_count_before,
            summary.edge_count_after,
            summary.edge_count_before
        ));
        debug!(
            nodes_before = summary.node_count_before,
            nodes_after = summary.node_count_after,
            edges_before = summary.edge_count_before,
            edges_after = summary.edge_count_after,
            "truncated flow map"
        );
    }

    TruncatedMap {
        map: NormalizedMap {
            project_key: map.project_key.clone(),
            nodes,
            edges,
            stats: derived.stats,
            roots: derived.roots,
            leaves: derived.leaves,
            warnings,
        },
        truncation: summary,
    }
}
