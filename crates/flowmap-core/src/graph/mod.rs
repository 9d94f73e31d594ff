//! Flow graph normalization and truncation.
//!
//! # Pipeline
//!
//! ```text
//! raw JSON + NormalizeOptions
//!        ↓  build::normalize()
//!        │    ├─ guard:  narrowing + per-item warnings
//!        │    ├─ infer:  kinds, implicit subtypes, relations
//!        │    └─ edges:  ordered-pair dedup by relation rank
//! NormalizedMap (sorted nodes/edges, roots, leaves, stats, warnings)
//!        ↓  truncate::truncate()   (optional)
//! TruncatedMap (bounded, edge-consistent, stats re-derived)
//! ```
//!
//! Both stages are pure: no I/O, no clock, no randomness. Identical input
//! produces byte-identical output.

pub mod build;
pub mod edges;
pub mod stats;
pub mod truncate;

pub use build::{NOT_AN_OBJECT, normalize};
pub use edges::EdgeSet;
pub use stats::Derived;
pub use truncate::{TruncationCaps, truncate};
