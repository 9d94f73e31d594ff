//! Canonical map construction from a raw flow graph document.
//!
//! # Overview
//!
//! The raw document is third-party JSON of roughly this shape:
//!
//! ```text
//! {
//!   "nodes":    { "<key>": { "type", "subType", "ref", "id", "name",
//!                            "predecessors", "successors", "connection", ... } },
//!   "datasets": ["<name>", ...],
//!   "recipes":  ["<name>", ...],
//!   "folders":  ["<id>", ...]
//! }
//! ```
//!
//! None of it is trusted. The build runs in passes over two working tables:
//!
//! 1. **Declarations**: every `nodes` entry is upserted into the
//!    [`NodeTable`] under its canonical id (`ref`, else the map key). Once
//!    all entries are read, canonical ids, then map keys, then `id` fields
//!    are registered in the [`AliasTable`].
//! 2. **Enumerations**: `datasets`/`recipes`/`folders` and the matching
//!    inventory lists guarantee orphans appear as isolated nodes.
//! 3. **Folder names**: friendly folder names repair folders that were only
//!    known by id.
//! 4. **Edges**: adjacency references are resolved through the alias table.
//!    Unknown endpoints become `other`-kind placeholder nodes, so no edge can
//!    dangle.
//!
//! Adjacency entries may use any alias form, which is why the alias table is
//! complete before the edge pass starts.
//!
//! ## Repeated Declarations
//!
//! Two map entries resolving to the same canonical id share one node.
//! Attributes are first-non-empty-wins, the kind follows [`merge_kind`], and
//! the later declaration's adjacency lists replace the earlier ones.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::graph::edges::EdgeSet;
use crate::graph::stats::Derived;
use crate::guard::{Warnings, as_record, as_string_array, field_str, json_type_name};
use crate::infer::{NodeKind, infer_kind, infer_relation, infer_subtype_from_type, merge_kind};
use crate::model::{MapNode, NormalizeOptions, NormalizedMap};

/// Warning emitted when the top-level document is not a JSON object.
pub const NOT_AN_OBJECT: &str = "Flow graph response was not an object.";

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

/// Build the canonical connectivity map for `raw`.
///
/// Never fails. A non-object document yields an empty map whose only warning
/// is [`NOT_AN_OBJECT`]; every other defect is skipped or patched and
/// recorded in `warnings`.
#[instrument(skip(raw, options))]
#[must_use]
pub fn normalize(raw: &Value, project_key: &str, options: &NormalizeOptions) -> NormalizedMap {
    let Some(root) = as_record(raw) else {
        let mut map = NormalizedMap::empty(project_key);
        map.warnings.push(NOT_AN_OBJECT.to_string());
        return map;
    };

    let mut builder = Builder::new(options);
    builder.declare_nodes(root.get("nodes"));
    builder.merge_enumerations(root);
    builder.repair_folder_names();
    let edges = builder.resolve_edges();

    let Builder {
        table, warnings, ..
    } = builder;
    let nodes = table.into_nodes();
    let edges = edges.into_sorted_edges();
    let derived = Derived::compute(&nodes, &edges);

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        roots = derived.roots.len(),
        leaves = derived.leaves.len(),
        warnings = warnings.len(),
        "normalized flow graph"
    );

    NormalizedMap {
        project_key: project_key.to_string(),
        nodes,
        edges,
        stats: derived.stats,
        roots: derived.roots,
        leaves: derived.leaves,
        warnings: warnings.into_vec(),
    }
}

// ---------------------------------------------------------------------------
// Working tables
// ---------------------------------------------------------------------------

/// A canonical node plus the raw adjacency references it was declared with.
#[derive(Debug, Clone)]
struct WorkingNode {
    node: MapNode,
    predecessors: Vec<String>,
    successors: Vec<String>,
}

/// Canonical nodes keyed by id. Iteration order is sorted by id.
#[derive(Debug, Default)]
struct NodeTable {
    nodes: BTreeMap<String, WorkingNode>,
}

impl NodeTable {
    /// Insert `incoming`, or merge it into the node already stored under its id.
    fn upsert(&mut self, incoming: MapNode) -> &mut WorkingNode {
        match self.nodes.entry(incoming.id.clone()) {
            std::collections::btree_map::Entry::Vacant(slot) => slot.insert(WorkingNode {
                node: incoming,
                predecessors: Vec::new(),
                successors: Vec::new(),
            }),
            std::collections::btree_map::Entry::Occupied(slot) => {
                let existing = slot.into_mut();
                merge_node(&mut existing.node, incoming);
                existing
            }
        }
    }

    fn get(&self, id: &str) -> Option<&WorkingNode> {
        self.nodes.get(id)
    }

    fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn into_nodes(self) -> Vec<MapNode> {
        self.nodes.into_values().map(|w| w.node).collect()
    }
}

/// Merge reducer for repeated declarations of one canonical id.
///
/// Optional attributes keep the first non-empty value; the kind follows
/// [`merge_kind`].
fn merge_node(existing: &mut MapNode, incoming: MapNode) {
    existing.kind = merge_kind(existing.kind, incoming.kind);
    if existing.name.is_none() {
        existing.name = incoming.name;
    }
    if existing.subtype.is_none() {
        existing.subtype = incoming.subtype;
    }
    if existing.connection.is_none() {
        existing.connection = incoming.connection;
    }
}

/// Reference forms of one declaration, registered after the whole `nodes`
/// member has been read.
struct Declared<'a> {
    key: &'a str,
    id: &'a str,
    alt: Option<&'a str>,
}

/// Flat map from every observed reference form to a canonical id.
#[derive(Debug, Default)]
struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    /// Register `alias → id`. The first registration of an alias wins.
    fn register(&mut self, alias: &str, id: &str) {
        if alias.is_empty() {
            return;
        }
        self.aliases
            .entry(alias.to_string())
            .or_insert_with(|| id.to_string());
    }

    /// Resolve a reference, falling back to the literal reference.
    fn resolve<'a>(&'a self, reference: &'a str) -> &'a str {
        self.aliases.get(reference).map_or(reference, String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

struct Builder<'o> {
    options: &'o NormalizeOptions,
    table: NodeTable,
    aliases: AliasTable,
    warnings: Warnings,
}

impl<'o> Builder<'o> {
    fn new(options: &'o NormalizeOptions) -> Self {
        Self {
            options,
            table: NodeTable::default(),
            aliases: AliasTable::default(),
            warnings: Warnings::new(),
        }
    }

    /// Pass 1: upsert every declared node and register its aliases.
    fn declare_nodes(&mut self, nodes: Option<&Value>) {
        let entries = match nodes {
            None | Some(Value::Null) => return,
            Some(Value::Object(entries)) => entries,
            Some(other) => {
                self.warnings.push(format!(
                    "Flow graph `nodes` was not an object (got {}); ignoring it.",
                    json_type_name(other)
                ));
                return;
            }
        };

        let mut declared = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let Some(record) = as_record(value) else {
                self.warnings.push(format!(
                    "Skipped flow node `{key}`: expected an object, got {}.",
                    json_type_name(value)
                ));
                continue;
            };
            declared.extend(self.declare_node(key, record));
        }

        // Canonical ids first, then map keys, then `id` fields: a secondary
        // form never shadows a key that names a declared node.
        for d in &declared {
            self.aliases.register(d.id, d.id);
        }
        for d in &declared {
            self.aliases.register(d.key, d.id);
        }
        for d in &declared {
            if let Some(alt) = d.alt {
                self.aliases.register(alt, d.id);
            }
        }
    }

    fn declare_node<'a>(
        &mut self,
        key: &'a str,
        record: &'a Map<String, Value>,
    ) -> Option<Declared<'a>> {
        let reference = field_str(record, "ref");
        let id = reference.unwrap_or(key);
        if id.is_empty() {
            self.warnings
                .push("Skipped flow node with an empty key and no `ref`.".to_string());
            return None;
        }

        let type_tag = field_str(record, "type");
        let kind = infer_kind(type_tag);
        let subtype = field_str(record, "subType")
            .or_else(|| field_str(record, "subtype"))
            .map(str::to_string)
            .or_else(|| infer_subtype_from_type(type_tag));

        let fallback_name = field_str(record, "name")
            .or_else(|| field_str(record, "label"))
            .or(reference)
            .unwrap_or(key);
        let name = if kind == NodeKind::Folder {
            self.options.folder_name(id).unwrap_or(fallback_name)
        } else {
            fallback_name
        };

        let connection = field_str(record, "connection").or_else(|| {
            record
                .get("params")
                .and_then(as_record)
                .and_then(|params| field_str(params, "connection"))
        });

        let predecessors = as_string_array(
            record.get("predecessors"),
            &mut self.warnings,
            &format!("nodes.{key}.predecessors"),
        );
        let successors = as_string_array(
            record.get("successors"),
            &mut self.warnings,
            &format!("nodes.{key}.successors"),
        );

        let working = self.table.upsert(MapNode {
            id: id.to_string(),
            kind,
            name: Some(name.to_string()),
            subtype,
            connection: connection.map(str::to_string),
        });
        working.predecessors = predecessors;
        working.successors = successors;

        Some(Declared {
            key,
            id,
            alt: field_str(record, "id"),
        })
    }

    /// Pass 2: make sure every enumerated entity exists as a node.
    fn merge_enumerations(&mut self, root: &Map<String, Value>) {
        let options = self.options;

        let datasets = self.enumeration(root, "datasets", &options.all_dataset_names);
        for name in &datasets {
            self.ensure_enumerated(name, NodeKind::Dataset, name);
        }

        let recipes = self.enumeration(root, "recipes", &options.all_recipe_names);
        for name in &recipes {
            self.ensure_enumerated(name, NodeKind::Recipe, name);
        }

        let folders = self.enumeration(root, "folders", &options.all_folder_ids);
        for folder_id in &folders {
            let canonical = self.aliases.resolve(folder_id);
            let display = options
                .folder_name(canonical)
                .or_else(|| options.folder_name(folder_id))
                .unwrap_or(folder_id);
            self.ensure_enumerated(folder_id, NodeKind::Folder, display);
        }
    }

    /// Deduplicated union of `root[field]` and an inventory list.
    fn enumeration(
        &mut self,
        root: &Map<String, Value>,
        field: &str,
        inventory: &[String],
    ) -> BTreeSet<String> {
        let mut entries: BTreeSet<String> =
            as_string_array(root.get(field), &mut self.warnings, field)
                .into_iter()
                .collect();
        entries.extend(inventory.iter().filter(|s| !s.is_empty()).cloned());
        entries
    }

    fn ensure_enumerated(&mut self, entry: &str, kind: NodeKind, name: &str) {
        let id = self.aliases.resolve(entry).to_string();
        self.aliases.register(entry, &id);
        let mut node = MapNode::new(id, kind);
        node.name = Some(name.to_string());
        self.table.upsert(node);
    }

    /// Pass 3: give folders their friendly name when they only carry their id.
    fn repair_folder_names(&mut self) {
        let options = self.options;
        for working in self.table.nodes.values_mut() {
            let node = &mut working.node;
            if node.kind != NodeKind::Folder {
                continue;
            }
            let Some(friendly) = options.folder_name(&node.id) else {
                continue;
            };
            let needs_repair = node
                .name
                .as_deref()
                .is_none_or(|name| name.is_empty() || name == node.id);
            if needs_repair {
                node.name = Some(friendly.to_string());
            }
        }
    }

    /// Pass 4: resolve adjacency references into deduplicated edges.
    fn resolve_edges(&mut self) -> EdgeSet {
        // Snapshot adjacency first: resolving may insert placeholder nodes.
        let adjacency: Vec<(String, Vec<String>, Vec<String>)> = self
            .table
            .nodes
            .iter()
            .map(|(id, w)| (id.clone(), w.predecessors.clone(), w.successors.clone()))
            .collect();

        let mut edges = EdgeSet::new();
        for (id, predecessors, successors) in adjacency {
            for reference in &predecessors {
                let from = self.resolve_endpoint(reference);
                self.emit(&mut edges, from, id.clone());
            }
            for reference in &successors {
                let to = self.resolve_endpoint(reference);
                self.emit(&mut edges, id.clone(), to);
            }
        }
        edges
    }

    /// Resolve an adjacency reference to a canonical id, creating a
    /// placeholder node the first time an unknown id is seen.
    fn resolve_endpoint(&mut self, reference: &str) -> String {
        let id = self.aliases.resolve(reference).to_string();
        if !self.table.contains(&id) {
            self.table.upsert(MapNode::new(id.clone(), NodeKind::Other));
            self.aliases.register(reference, &id);
            self.warnings.push(format!(
                "Edge references unknown node `{reference}`; inserted placeholder node `{id}`."
            ));
        }
        id
    }

    fn emit(&self, edges: &mut EdgeSet, from: String, to: String) {
        let kind_of = |id: &str| self.table.get(id).map_or(NodeKind::Other, |w| w.node.kind);
        let relation = infer_relation(kind_of(&from), kind_of(&to));
        edges.insert(from, to, relation);
    }
}
