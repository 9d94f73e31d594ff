//! Degree-derived roots, leaves, and summary counts.
//!
//! # Definitions
//!
//! - **root**: a node no edge points to (in-degree 0).
//! - **leaf**: a node no edge leaves (out-degree 0).
//!
//! An isolated node is both. A pure cycle has neither. Self-loops count
//! toward both degrees of their node.
//!
//! The same [`Derived::compute`] is used for fresh and truncated maps, so
//! truncated statistics always describe the retained subgraph.

use std::collections::HashMap;

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::IntoNodeIdentifiers,
};

use crate::infer::NodeKind;
use crate::model::{MapEdge, MapNode, MapStats};

/// Everything derived from a node/edge set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derived {
    pub roots: Vec<String>,
    pub leaves: Vec<String>,
    pub stats: MapStats,
}

impl Derived {
    /// Derive roots, leaves, and stats from `nodes` and `edges`.
    ///
    /// Edges whose endpoints are not in `nodes` are ignored; callers keep the
    /// sets consistent, so in practice none are dropped.
    #[must_use]
    pub fn compute(nodes: &[MapNode], edges: &[MapEdge]) -> Self {
        let mut graph = DiGraph::<&str, ()>::with_capacity(nodes.len(), edges.len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let idx = graph.add_node(node.id.as_str());
            index.insert(node.id.as_str(), idx);
        }

        for edge in edges {
            if let (Some(&a), Some(&b)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str())) {
                graph.add_edge(a, b, ());
            }
        }

        let mut roots: Vec<String> = Vec::new();
        let mut leaves: Vec<String> = Vec::new();

        for idx in graph.node_identifiers() {
            let Some(id) = graph.node_weight(idx) else {
                continue;
            };
            if graph
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none()
            {
                roots.push((*id).to_string());
            }
            if graph
                .neighbors_directed(idx, Direction::Outgoing)
                .next()
                .is_none()
            {
                leaves.push((*id).to_string());
            }
        }

        roots.sort_unstable();
        leaves.sort_unstable();

        let stats = MapStats {
            node_count: nodes.len(),
            edge_count: edges.len(),
            datasets: count_kind(nodes, NodeKind::Dataset),
            recipes: count_kind(nodes, NodeKind::Recipe),
            roots: roots.len(),
            leaves: leaves.len(),
        };

        Self {
            roots,
            leaves,
            stats,
        }
    }
}

fn count_kind(nodes: &[MapNode], kind: NodeKind) -> usize {
    nodes.iter().filter(|n| n.kind == kind).count()
}
