//! # KG Graph
//!
//! Knowledge-graph model for the active-memory explorer: turns a flat list of
//! subject-predicate-object assertions into a deduplicated node/edge graph and
//! answers shortest-path queries over it.
//!
//! ## Architecture
//!
//! ```text
//! Assertion[]
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Filter malformed assertions (permissive)
//!     │      ├─ Collect distinct subject/object terms (sorted)
//!     │      ├─ Classify node kind from namespace heuristics
//!     │      └─ Group edges per (subject, object) with predicate summaries
//!     │
//!     ├──> KgGraph (petgraph)
//!     │      ├─ Nodes: terms (id, label, kind, position)
//!     │      └─ Edges: grouped assertions + summary label
//!     │
//!     └──> Path Finder
//!            ├─ Unweighted BFS, directed or undirected
//!            └─ Reachability diagnostics when no path exists
//! ```
//!
//! Layout computation lives in the `kg-layout` crate; this crate only carries
//! the position type so hosts can stamp layout results onto nodes.

mod types;
mod term;
mod builder;
mod path;

pub use types::{Assertion, KgEdge, KgGraph, KgNode, NodeKind, XY};
pub use term::{
    classify_term, default_structural_predicates, display_label, is_structural_predicate,
    short_label,
};
pub use builder::{
    assertions_from_values, build_graph, filter_structural, predicate_summary, BuildOptions,
};
pub use path::{path_diagnostics, shortest_path, PathDiagnostics, PathOptions, PathResult};
