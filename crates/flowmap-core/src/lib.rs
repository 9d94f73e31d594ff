#![forbid(unsafe_code)]
//! flowmap-core library.
//!
//! Turns a loosely-typed pipeline flow graph (parsed JSON of unknown shape)
//! into a canonical, deterministic connectivity map, and bounds that map for
//! transport.
//!
//! # Conventions
//!
//! - **Errors**: `normalize` and `truncate` never fail. Malformed input is
//!   reported through the map's `warnings` list. Config loading uses
//!   `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!
//! # Typical Usage
//!
//! ```rust,ignore
//! use flowmap_core::{NormalizeOptions, TruncationCaps, normalize, truncate};
//!
//! let raw: serde_json::Value = serde_json::from_str(&body)?;
//! let map = normalize(&raw, "PROJ", &NormalizeOptions::default());
//! let out = truncate(&map, TruncationCaps::new(Some(300), Some(600)));
//!
//! println!("{} nodes, truncated={}", out.map.stats.node_count, out.truncation.truncated);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod guard;
pub mod infer;
pub mod model;

pub use graph::{TruncationCaps, normalize, truncate};
pub use infer::{NodeKind, Relation};
pub use model::{
    MapEdge, MapNode, MapStats, NormalizeOptions, NormalizedMap, TruncatedMap, TruncationSummary,
};
