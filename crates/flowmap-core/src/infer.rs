//! Node kind and edge relation inference.
//!
//! # Pipeline Model
//!
//! Recipes consume upstream artifacts (datasets, managed folders) and produce
//! downstream ones. Edge semantics therefore follow from the endpoint kinds:
//!
//! | from             | to               | relation     |
//! |------------------|------------------|--------------|
//! | dataset / folder | recipe           | `reads`      |
//! | recipe           | dataset / folder | `writes`     |
//! | any              | other            | `unknown`    |
//! | other            | any              | `unknown`    |
//! | same category    | same category    | `depends_on` |
//!
//! Type tags are free text upstream (`"RUNNABLE_IMPLICIT_RECIPE"`,
//! `"COMPUTABLE_FOLDER"`, ...), so kinds are matched by substring.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Coarse category of a flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Dataset,
    Recipe,
    Folder,
    Other,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Recipe => "recipe",
            Self::Folder => "folder",
            Self::Other => "other",
        }
    }

    /// Datasets and folders are the artifacts recipes read and write.
    #[must_use]
    pub const fn is_artifact(self) -> bool {
        matches!(self, Self::Dataset | Self::Folder)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Relation
// ---------------------------------------------------------------------------

/// Semantic label of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Reads,
    Writes,
    DependsOn,
    Unknown,
}

impl Relation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reads => "reads",
            Self::Writes => "writes",
            Self::DependsOn => "depends_on",
            Self::Unknown => "unknown",
        }
    }

    /// Priority used when duplicate edges disagree on their relation.
    ///
    /// `reads`/`writes` = 3, `depends_on` = 2, `unknown` = 1.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Reads | Self::Writes => 3,
            Self::DependsOn => 2,
            Self::Unknown => 1,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

/// Map a raw type tag to a [`NodeKind`].
///
/// Checked in order: `RECIPE`, `DATASET`, `FOLDER`. Anything else, including
/// a missing tag, is [`NodeKind::Other`].
#[must_use]
pub fn infer_kind(type_tag: Option<&str>) -> NodeKind {
    let Some(tag) = type_tag else {
        return NodeKind::Other;
    };
    let tag = tag.to_ascii_uppercase();
    if tag.contains("RECIPE") {
        NodeKind::Recipe
    } else if tag.contains("DATASET") {
        NodeKind::Dataset
    } else if tag.contains("FOLDER") {
        NodeKind::Folder
    } else {
        NodeKind::Other
    }
}

/// Synthesize a subtype for auto-generated recipes, which carry none upstream.
#[must_use]
pub fn infer_subtype_from_type(type_tag: Option<&str>) -> Option<String> {
    type_tag
        .filter(|tag| tag.to_ascii_uppercase().contains("IMPLICIT_RECIPE"))
        .map(|_| "implicit".to_string())
}

/// Derive the relation of an edge `from → to` from its endpoint kinds.
#[must_use]
pub const fn infer_relation(from: NodeKind, to: NodeKind) -> Relation {
    match (from, to) {
        (NodeKind::Other, _) | (_, NodeKind::Other) => Relation::Unknown,
        (f, NodeKind::Recipe) if f.is_artifact() => Relation::Reads,
        (NodeKind::Recipe, t) if t.is_artifact() => Relation::Writes,
        _ => Relation::DependsOn,
    }
}

/// Kind-preference reducer applied on every repeated declaration.
///
/// A concrete kind replaces [`NodeKind::Other`]; otherwise the existing kind
/// is kept, so the first concrete declaration wins.
#[must_use]
pub const fn merge_kind(existing: NodeKind, incoming: NodeKind) -> NodeKind {
    match (existing, incoming) {
        (NodeKind::Other, incoming) => incoming,
        (existing, _) => existing,
    }
}
