use crate::rng::Mulberry32;
use kg_graph::{KgGraph, XY};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::f64::consts::TAU;
use std::fmt;

const GRID_SPACING_X: f64 = 240.0;
const GRID_SPACING_Y: f64 = 120.0;
const RING_SPACING: f64 = 260.0;
const ROOT_TIE_RING_RADIUS: f64 = 80.0;
const RING_ANGLE_DRIFT: f64 = 0.35;

/// One-shot layout strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Grid,
    Circle,
    Radial,
    Force,
}

impl LayoutKind {
    /// Permissive parse; `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grid" => Some(Self::Grid),
            "circle" => Some(Self::Circle),
            "radial" => Some(Self::Radial),
            "force" => Some(Self::Force),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Circle => "circle",
            Self::Radial => "radial",
            Self::Force => "force",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`compute_layout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOptions {
    pub kind: LayoutKind,
    pub seed: u32,
}

/// Compute a full position map for the graph under the chosen strategy.
///
/// Pure and deterministic for a given node-id set and seed; grid ignores the
/// seed entirely.
pub fn compute_layout(graph: &KgGraph, options: &LayoutOptions) -> HashMap<String, XY> {
    log::debug!(
        "computing {} layout for {} nodes (seed {})",
        options.kind,
        graph.node_count(),
        options.seed
    );
    match options.kind {
        LayoutKind::Grid => grid_layout(graph),
        LayoutKind::Circle => circle_layout(graph, options.seed),
        LayoutKind::Radial => radial_layout(graph, options.seed),
        LayoutKind::Force => force_layout(graph, options.seed),
    }
}

fn sorted_ids(graph: &KgGraph) -> Vec<&str> {
    let mut ids: Vec<&str> = graph.node_ids().collect();
    ids.sort_unstable();
    ids
}

fn seed_angle(seed: u32) -> f64 {
    f64::from(seed % 360).to_radians()
}

/// Square-ish grid over sorted node ids, 240x120 cell spacing.
pub fn grid_layout(graph: &KgGraph) -> HashMap<String, XY> {
    let ids = sorted_ids(graph);
    let cols = ((ids.len() as f64).sqrt().ceil() as usize).max(1);
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let row = i / cols;
            let col = i % cols;
            (
                id.to_string(),
                XY::new(col as f64 * GRID_SPACING_X, row as f64 * GRID_SPACING_Y),
            )
        })
        .collect()
}

/// All nodes evenly spaced on one circle; the start angle comes from the seed.
pub fn circle_layout(graph: &KgGraph, seed: u32) -> HashMap<String, XY> {
    let ids = sorted_ids(graph);
    if ids.is_empty() {
        return HashMap::new();
    }
    let n = ids.len();
    let radius = 260.0_f64.max((n as f64).sqrt() * 150.0);
    let start = seed_angle(seed);
    let step = TAU / n as f64;
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let angle = start + i as f64 * step;
            (id.to_string(), XY::new(radius * angle.cos(), radius * angle.sin()))
        })
        .collect()
}

/// BFS rings around the max-degree roots.
///
/// Every node tied for the maximum degree sits at level 0: alone at the
/// origin, or on a small 80-unit ring when several tie. Disconnected nodes
/// land on an extra outermost ring. Each ring's start angle drifts by
/// 0.35 rad per level so rings do not align radially.
pub fn radial_layout(graph: &KgGraph, seed: u32) -> HashMap<String, XY> {
    let ids = sorted_ids(graph);
    if ids.is_empty() {
        return HashMap::new();
    }

    let mut degree: HashMap<&str, usize> = HashMap::new();
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for e in graph.edges() {
        *degree.entry(e.source.as_str()).or_insert(0) += 1;
        *degree.entry(e.target.as_str()).or_insert(0) += 1;
        adj.entry(e.source.as_str()).or_default().push(e.target.as_str());
        adj.entry(e.target.as_str()).or_default().push(e.source.as_str());
    }
    for neighbors in adj.values_mut() {
        neighbors.sort_unstable();
        neighbors.dedup();
    }

    let best = ids
        .iter()
        .map(|id| degree.get(id).copied().unwrap_or(0))
        .max()
        .unwrap_or(0);

    // ids are sorted, so tied roots enter the BFS queue id-ascending.
    let mut level: HashMap<&str, usize> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for &id in &ids {
        if degree.get(id).copied().unwrap_or(0) == best {
            level.insert(id, 0);
            queue.push_back(id);
        }
    }
    let mut max_level = 0;
    while let Some(cur) = queue.pop_front() {
        let cur_level = level[cur];
        if let Some(neighbors) = adj.get(cur) {
            for &next in neighbors {
                if level.contains_key(next) {
                    continue;
                }
                level.insert(next, cur_level + 1);
                max_level = max_level.max(cur_level + 1);
                queue.push_back(next);
            }
        }
    }

    let orphan_level = max_level + 1;
    let mut rings: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for &id in &ids {
        let l = level.get(id).copied().unwrap_or(orphan_level);
        rings.entry(l).or_default().push(id);
    }

    let base_angle = seed_angle(seed);
    let mut positions = HashMap::with_capacity(ids.len());
    for (ring_level, members) in rings {
        let radius = if ring_level == 0 {
            if members.len() > 1 {
                ROOT_TIE_RING_RADIUS
            } else {
                0.0
            }
        } else {
            RING_SPACING * ring_level as f64
        };
        let start = base_angle + ring_level as f64 * RING_ANGLE_DRIFT;
        let step = TAU / members.len() as f64;
        for (i, id) in members.iter().enumerate() {
            let angle = start + i as f64 * step;
            positions.insert(
                id.to_string(),
                XY::new(radius * angle.cos(), radius * angle.sin()),
            );
        }
    }
    positions
}

/// Jitter amplitude used by the static force layout and the simulation's
/// initial perturbation. Empirically tuned; saved layouts depend on it.
pub fn jitter_amplitude(node_count: usize) -> f64 {
    ((node_count as f64).sqrt() * 2.75).clamp(10.0, 42.0)
}

/// Static force layout: the radial layout plus seeded jitter, so it is
/// reproducible without running the simulation.
pub fn force_layout(graph: &KgGraph, seed: u32) -> HashMap<String, XY> {
    let ids = sorted_ids(graph);
    let mut positions = radial_layout(graph, seed);
    let amplitude = jitter_amplitude(ids.len());
    let mut rng = Mulberry32::new(seed);
    for id in ids {
        if let Some(p) = positions.get_mut(id) {
            p.x += (rng.next() - 0.5) * amplitude;
            p.y += (rng.next() - 0.5) * amplitude;
        }
    }
    positions
}

/// Complete a position map over the graph's current node set: take `primary`
/// where present, fall back to `fallback`, and synthesize the origin for ids
/// covered by neither. User-dragged positions survive as long as they are in
/// `primary`.
pub fn complete_positions(
    graph: &KgGraph,
    primary: &HashMap<String, XY>,
    fallback: &HashMap<String, XY>,
) -> HashMap<String, XY> {
    graph
        .node_ids()
        .map(|id| {
            let p = primary
                .get(id)
                .or_else(|| fallback.get(id))
                .copied()
                .unwrap_or_default();
            (id.to_string(), p)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kg_graph::{build_graph, Assertion, BuildOptions};

    fn graph_from(assertions: &[(&str, &str, &str)]) -> KgGraph {
        let assertions: Vec<Assertion> = assertions
            .iter()
            .map(|(s, p, o)| Assertion::new(*s, *p, *o))
            .collect();
        build_graph(&assertions, &BuildOptions::default())
    }

    fn star_graph() -> KgGraph {
        graph_from(&[
            ("hub", "p", "a"),
            ("hub", "p", "b"),
            ("hub", "p", "c"),
            ("a", "p", "b"),
        ])
    }

    #[test]
    fn grid_places_sorted_ids_row_major() {
        let graph = graph_from(&[("a", "p", "b"), ("c", "p", "d")]);
        let positions = grid_layout(&graph);
        assert_eq!(positions["a"], XY::new(0.0, 0.0));
        assert_eq!(positions["b"], XY::new(240.0, 0.0));
        assert_eq!(positions["c"], XY::new(0.0, 120.0));
        assert_eq!(positions["d"], XY::new(240.0, 120.0));
    }

    #[test]
    fn grid_ignores_seed() {
        let graph = star_graph();
        let a = compute_layout(&graph, &LayoutOptions { kind: LayoutKind::Grid, seed: 1 });
        let b = compute_layout(&graph, &LayoutOptions { kind: LayoutKind::Grid, seed: 999 });
        assert_eq!(a, b);
    }

    #[test]
    fn circle_uses_minimum_radius_and_seed_angle() {
        // Three nodes: sqrt(3) * 150 < 260, so the minimum radius applies.
        let graph = graph_from(&[("a", "p", "b"), ("b", "p", "c")]);
        let positions = circle_layout(&graph, 0);
        for p in positions.values() {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 260.0).abs() < 1e-9);
        }

        let rotated = circle_layout(&graph, 90);
        assert_ne!(positions["a"], rotated["a"]);
        assert_eq!(rotated, circle_layout(&graph, 90));
    }

    #[test]
    fn circle_radius_grows_with_node_count() {
        let graph = star_graph();
        let positions = circle_layout(&graph, 0);
        let expected = (graph.node_count() as f64).sqrt() * 150.0;
        for p in positions.values() {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn radial_roots_the_max_degree_node() {
        let graph = star_graph();
        let positions = radial_layout(&graph, 7);
        // hub has degree 4 and sits alone at level 0 -> origin.
        assert_eq!(positions["hub"], XY::new(0.0, 0.0));
        // Direct neighbors are on the first ring.
        for id in ["a", "b", "c"] {
            let p = &positions[id];
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 260.0).abs() < 1e-9, "{id} not on ring 1: {r}");
        }
    }

    #[test]
    fn radial_ties_for_root_share_the_inner_ring() {
        // Both nodes have degree 1, so neither sits alone at the origin.
        let graph = graph_from(&[("A", "p", "B")]);
        let positions = radial_layout(&graph, 0);
        for id in ["A", "B"] {
            let p = &positions[id];
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 80.0).abs() < 1e-9, "{id} not on the root-tie ring: {r}");
        }
    }

    #[test]
    fn radial_puts_disconnected_nodes_on_outer_ring() {
        let graph = graph_from(&[("hub", "p", "a"), ("lonely", "p", "")]);
        let positions = radial_layout(&graph, 0);
        // hub and a tie for root at level 0, so the orphan lands on ring 1.
        let p = &positions["lonely"];
        let r = (p.x * p.x + p.y * p.y).sqrt();
        assert!((r - 260.0).abs() < 1e-9);
        for id in ["a", "hub"] {
            let p = &positions[id];
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 80.0).abs() < 1e-9, "{id} not on the root-tie ring: {r}");
        }
    }

    #[test]
    fn force_is_jittered_radial_and_reproducible() {
        let graph = star_graph();
        let radial = radial_layout(&graph, 11);
        let force = force_layout(&graph, 11);
        assert_eq!(force, force_layout(&graph, 11));
        assert_ne!(force, force_layout(&graph, 12));

        let amplitude = jitter_amplitude(graph.node_count());
        for (id, p) in &force {
            let base = &radial[id];
            assert!((p.x - base.x).abs() <= amplitude / 2.0 + 1e-9);
            assert!((p.y - base.y).abs() <= amplitude / 2.0 + 1e-9);
        }
    }

    #[test]
    fn jitter_amplitude_is_clamped() {
        assert_eq!(jitter_amplitude(0), 10.0);
        assert_eq!(jitter_amplitude(4), 10.0);
        assert_eq!(jitter_amplitude(10_000), 42.0);
        let mid = jitter_amplitude(100);
        assert!((mid - 27.5).abs() < 1e-9);
    }

    #[test]
    fn every_layout_covers_every_node() {
        let graph = star_graph();
        for kind in [LayoutKind::Grid, LayoutKind::Circle, LayoutKind::Radial, LayoutKind::Force] {
            let positions = compute_layout(&graph, &LayoutOptions { kind, seed: 3 });
            assert_eq!(positions.len(), graph.node_count(), "{kind}");
            for id in graph.node_ids() {
                assert!(positions[id].is_finite());
            }
        }
    }

    #[test]
    fn complete_positions_prefers_primary_then_fallback_then_origin() {
        let graph = graph_from(&[("a", "p", "b"), ("b", "p", "c")]);
        let mut primary = HashMap::new();
        primary.insert("a".to_string(), XY::new(1.0, 2.0));
        let mut fallback = HashMap::new();
        fallback.insert("b".to_string(), XY::new(3.0, 4.0));

        let merged = complete_positions(&graph, &primary, &fallback);
        assert_eq!(merged["a"], XY::new(1.0, 2.0));
        assert_eq!(merged["b"], XY::new(3.0, 4.0));
        assert_eq!(merged["c"], XY::default());
    }

    #[test]
    fn layout_kind_parsing_is_permissive() {
        assert_eq!(LayoutKind::parse(" Radial "), Some(LayoutKind::Radial));
        assert_eq!(LayoutKind::parse("FORCE"), Some(LayoutKind::Force));
        assert_eq!(LayoutKind::parse("spiral"), None);
        assert_eq!(LayoutKind::default(), LayoutKind::Grid);
    }
}
