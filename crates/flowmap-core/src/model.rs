//! Canonical map types handed to presentation and transport layers.
//!
//! All output types serialize with camelCase keys. Optional node attributes
//! are omitted when absent; truncation caps serialize as `null` when
//! unbounded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::infer::{NodeKind, Relation};

/// One canonical node, unique by `id` after alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
}

impl MapNode {
    /// A bare node carrying only an id and kind.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            subtype: None,
            connection: None,
        }
    }
}

/// A directed edge `from → to`. At most one per ordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEdge {
    pub from: String,
    pub to: String,
    pub relation: Relation,
}

/// Summary counts derived from a node/edge set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Number of dataset-kind nodes.
    pub datasets: usize,
    /// Number of recipe-kind nodes.
    pub recipes: usize,
    /// Number of nodes with in-degree 0.
    pub roots: usize,
    /// Number of nodes with out-degree 0.
    pub leaves: usize,
}

/// The canonical connectivity map of one project flow.
///
/// `nodes` are sorted by id, `edges` by `(from, to, relation)`, `roots` and
/// `leaves` lexicographically. Identical input always produces an identical
/// map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMap {
    pub project_key: String,
    pub nodes: Vec<MapNode>,
    pub edges: Vec<MapEdge>,
    pub stats: MapStats,
    pub roots: Vec<String>,
    pub leaves: Vec<String>,
    pub warnings: Vec<String>,
}

impl NormalizedMap {
    /// A map with no nodes, no edges and no warnings.
    #[must_use]
    pub fn empty(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            stats: MapStats::default(),
            roots: Vec::new(),
            leaves: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Look up a node by canonical id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&MapNode> {
        self.nodes
            .binary_search_by(|n| n.id.as_str().cmp(id))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    /// BLAKE3 digest of the node and edge lists.
    ///
    /// Warnings and derived statistics are excluded: two maps with the same
    /// hash describe the same connectivity.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for node in &self.nodes {
            hasher.update(b"n\x00");
            hasher.update(node.id.as_bytes());
            hasher.update(b"\x00");
            hasher.update(node.kind.as_str().as_bytes());
            for attr in [&node.name, &node.subtype, &node.connection] {
                hasher.update(b"\x00");
                if let Some(value) = attr {
                    hasher.update(b"\x01");
                    hasher.update(value.as_bytes());
                }
            }
            hasher.update(b"\x00");
        }
        for edge in &self.edges {
            hasher.update(b"e\x00");
            hasher.update(edge.from.as_bytes());
            hasher.update(b"\x00");
            hasher.update(edge.to.as_bytes());
            hasher.update(b"\x00");
            hasher.update(edge.relation.as_str().as_bytes());
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

/// Optional lookup tables supplied next to the raw graph.
///
/// The `all*` lists name entities known to exist even when the graph omits
/// them (for example datasets wired into nothing).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizeOptions {
    pub folder_names_by_id: BTreeMap<String, String>,
    pub all_dataset_names: Vec<String>,
    pub all_recipe_names: Vec<String>,
    pub all_folder_ids: Vec<String>,
}

impl NormalizeOptions {
    /// Friendly display name for a folder id, if one is known and non-empty.
    #[must_use]
    pub fn folder_name(&self, id: &str) -> Option<&str> {
        self.folder_names_by_id
            .get(id)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// Before/after accounting for one [`crate::truncate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncationSummary {
    /// `true` iff the node or edge count shrank.
    pub truncated: bool,
    pub max_nodes: Option<usize>,
    pub max_edges: Option<usize>,
    pub node_count_before: usize,
    pub node_count_after: usize,
    pub edge_count_before: usize,
    pub edge_count_after: usize,
}

/// A bounded map plus the summary of what was cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncatedMap {
    pub map: NormalizedMap,
    pub truncation: TruncationSummary,
}
