use crate::types::KgGraph;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Options for [`shortest_path`].
#[derive(Debug, Clone, Copy)]
pub struct PathOptions {
    /// Traverse edges source->target only; when false both directions are
    /// added to the adjacency structure.
    pub directed: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self { directed: true }
    }
}

/// A shortest path: node ids from start to end plus the edge ids between them
/// (always one shorter than the node sequence).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResult {
    pub node_ids: Vec<String>,
    pub edge_ids: Vec<String>,
}

/// Reachability statistics explaining a failed path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathDiagnostics {
    pub reachable_from_start: usize,
    pub end_reachable: bool,
    pub nodes: usize,
    pub edges: usize,
}

/// Unweighted shortest path via BFS.
///
/// Neighbors are visited in edge insertion order, so among equal-length
/// alternatives the first-discovered path wins; there is no canonical-path
/// guarantee beyond that. Returns `None` when either endpoint is blank or the
/// end is unreachable.
pub fn shortest_path(
    graph: &KgGraph,
    start_id: &str,
    end_id: &str,
    options: &PathOptions,
) -> Option<PathResult> {
    let start = start_id.trim();
    let end = end_id.trim();
    if start.is_empty() || end.is_empty() {
        return None;
    }
    if start == end {
        return Some(PathResult {
            node_ids: vec![start.to_string()],
            edge_ids: Vec::new(),
        });
    }

    let adj = adjacency(graph, options.directed);

    let mut queue: VecDeque<&str> = VecDeque::new();
    let mut prev_node: HashMap<&str, Option<&str>> = HashMap::new();
    let mut prev_edge: HashMap<&str, Option<&str>> = HashMap::new();
    queue.push_back(start);
    prev_node.insert(start, None);
    prev_edge.insert(start, None);

    'bfs: while let Some(cur) = queue.pop_front() {
        let Some(neighbors) = adj.get(cur) else {
            continue;
        };
        for &(to, edge_id) in neighbors {
            if prev_node.contains_key(to) {
                continue;
            }
            prev_node.insert(to, Some(cur));
            prev_edge.insert(to, Some(edge_id));
            if to == end {
                break 'bfs;
            }
            queue.push_back(to);
        }
    }

    if !prev_node.contains_key(end) {
        return None;
    }

    let mut node_ids: Vec<String> = Vec::new();
    let mut edge_ids: Vec<String> = Vec::new();
    let mut cur = Some(end);
    while let Some(id) = cur {
        node_ids.push(id.to_string());
        if let Some(Some(edge_id)) = prev_edge.get(id) {
            edge_ids.push(edge_id.to_string());
        }
        cur = prev_node.get(id).copied().flatten();
    }
    node_ids.reverse();
    edge_ids.reverse();

    Some(PathResult { node_ids, edge_ids })
}

/// Reachability statistics from `start` under the same directedness rules as
/// [`shortest_path`]; used to explain a `None` result to a user.
pub fn path_diagnostics(
    graph: &KgGraph,
    start_id: &str,
    end_id: &str,
    directed: bool,
) -> PathDiagnostics {
    let start = start_id.trim();
    let end = end_id.trim();
    let adj = adjacency(graph, directed);

    let mut visited: HashMap<&str, ()> = HashMap::new();
    if !start.is_empty() {
        let mut queue: VecDeque<&str> = VecDeque::new();
        visited.insert(start, ());
        queue.push_back(start);
        while let Some(cur) = queue.pop_front() {
            let Some(neighbors) = adj.get(cur) else {
                continue;
            };
            for &(to, _) in neighbors {
                if visited.contains_key(to) {
                    continue;
                }
                visited.insert(to, ());
                queue.push_back(to);
            }
        }
    }

    PathDiagnostics {
        reachable_from_start: visited.len(),
        end_reachable: visited.contains_key(end),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    }
}

/// Adjacency lists in edge insertion order; reverse direction appended right
/// after the forward one when undirected.
fn adjacency(graph: &KgGraph, directed: bool) -> HashMap<&str, Vec<(&str, &str)>> {
    let mut adj: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
    for e in graph.edges() {
        adj.entry(e.source.as_str())
            .or_default()
            .push((e.target.as_str(), e.id.as_str()));
        if !directed {
            adj.entry(e.target.as_str())
                .or_default()
                .push((e.source.as_str(), e.id.as_str()));
        }
    }
    adj
}
