use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A subject-predicate-object fact triple with provenance metadata.
///
/// Upstream data is semi-trusted; everything beyond the triple itself is
/// optional and carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    pub subject: String,
    pub predicate: String,
    pub object: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

impl Assertion {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            scope: None,
            owner_id: None,
            observed_at: None,
            confidence: None,
            provenance: None,
            attributes: None,
        }
    }
}

/// Node classification derived from the term's namespace and local prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Person,
    Org,
    Concept,
    Claim,
    Event,
    Doc,
    Thing,
    Vocab,
    Entity,
}

/// 2D position in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XY {
    pub x: f64,
    pub y: f64,
}

impl XY {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Graph node keyed by its term string (e.g. `ex:person-123`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KgNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub position: XY,
}

/// Graph edge holding the assertions it represents.
///
/// Grouped edges are keyed `edge:subject:object`; ungrouped ones
/// `edge:index:subject:predicate:object`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KgEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub assertions: Vec<Assertion>,
    pub predicate_summary: String,
}

/// Built knowledge graph: petgraph storage plus a term index for fast lookup.
///
/// Nodes are inserted in sorted-id order and edges in build order, and both
/// iterate back out in insertion order; the path finder's tie-break contract
/// depends on that.
pub struct KgGraph {
    graph: DiGraph<KgNode, KgEdge>,
    node_index: HashMap<String, NodeIndex>,
}

impl KgGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    pub(crate) fn add_node(&mut self, node: KgNode) -> NodeIndex {
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        idx
    }

    pub(crate) fn add_edge(&mut self, edge: KgEdge) -> bool {
        let (Some(&from), Some(&to)) = (
            self.node_index.get(&edge.source),
            self.node_index.get(&edge.target),
        ) else {
            return false;
        };
        self.graph.add_edge(from, to, edge);
        true
    }

    /// Nodes in insertion (sorted-id) order.
    pub fn nodes(&self) -> impl Iterator<Item = &KgNode> {
        self.graph.node_indices().filter_map(|idx| self.graph.node_weight(idx))
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &KgEdge> {
        self.graph.edge_indices().filter_map(|idx| self.graph.edge_weight(idx))
    }

    /// Node ids in insertion (sorted-id) order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes().map(|n| n.id.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Stamp a computed position map onto the nodes, falling back to the
    /// origin for ids the map does not cover.
    pub fn apply_positions(&mut self, positions: &HashMap<String, XY>) {
        for idx in self.graph.node_indices().collect::<Vec<_>>() {
            if let Some(node) = self.graph.node_weight_mut(idx) {
                node.position = positions.get(&node.id).copied().unwrap_or_default();
            }
        }
    }
}

impl Default for KgGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(id: &str) -> KgNode {
        KgNode {
            id: id.to_string(),
            label: id.to_string(),
            kind: NodeKind::Entity,
            position: XY::new(7.0, 7.0),
        }
    }

    #[test]
    fn apply_positions_falls_back_to_origin() {
        let mut graph = KgGraph::new();
        graph.add_node(node("a"));
        graph.add_node(node("b"));

        let mut positions = HashMap::new();
        positions.insert("a".to_string(), XY::new(10.0, 20.0));
        graph.apply_positions(&positions);

        let by_id: HashMap<&str, XY> =
            graph.nodes().map(|n| (n.id.as_str(), n.position)).collect();
        assert_eq!(by_id["a"], XY::new(10.0, 20.0));
        // Ids the map does not cover are reset, not left at their old spot.
        assert_eq!(by_id["b"], XY::default());
    }

    #[test]
    fn edges_with_unknown_endpoints_are_rejected() {
        let mut graph = KgGraph::new();
        graph.add_node(node("a"));
        let added = graph.add_edge(KgEdge {
            id: "edge:a:missing".to_string(),
            source: "a".to_string(),
            target: "missing".to_string(),
            assertions: Vec::new(),
            predicate_summary: String::new(),
        });
        assert!(!added);
        assert_eq!(graph.edge_count(), 0);
    }
}
