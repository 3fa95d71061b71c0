//! Iterative force-directed simulation.
//!
//! The state is an arena: node ids in a fixed array order plus parallel flat
//! `pos`/`vel`/`acc` buffers (two lanes per node) and an edge index-pair list.
//! Stepping mutates in place and allocates nothing. The state is single-owner:
//! exactly one driving loop advances it at a time, and the host event loop
//! owns iteration cadence and cancellation — this type does no scheduling,
//! timers, or I/O.

use crate::layouts::jitter_amplitude;
use crate::rng::Mulberry32;
use kg_graph::{KgGraph, XY};
use std::collections::HashMap;

const DISTANCE_EPSILON: f64 = 1e-6;
const INITIAL_SPREAD: f64 = 250.0;

/// Simulation tunables.
///
/// `spring_length` and `repulsion_strength` may be retuned between steps (the
/// UI's spread control does exactly that on a running simulation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimOptions {
    pub dt: f64,
    pub spring_length: f64,
    pub spring_strength: f64,
    pub repulsion_strength: f64,
    pub centering_strength: f64,
    pub damping: f64,
    pub max_speed: f64,
    /// Above this node count the O(n²) repulsion pass is skipped entirely.
    pub max_repulsion_nodes: usize,
    pub seed: u32,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1.0,
            spring_length: 240.0,
            spring_strength: 0.03,
            repulsion_strength: 9000.0,
            centering_strength: 0.003,
            damping: 0.85,
            max_speed: 90.0,
            max_repulsion_nodes: 320,
            seed: 0,
        }
    }
}

impl SimOptions {
    /// Default options scaled by the UI "spread" multiplier: spring length
    /// linearly, repulsion quadratically, with the multiplier clamped to
    /// `[0.6, 2.4]`.
    pub fn for_spread(spread: f64) -> Self {
        let s = if spread.is_finite() { spread.clamp(0.6, 2.4) } else { 1.0 };
        let base = Self::default();
        Self {
            spring_length: base.spring_length * s,
            repulsion_strength: base.repulsion_strength * s * s,
            ..base
        }
    }

    /// Replace non-finite or non-positive values with defaults and clamp
    /// damping into `(0, 1]`. Invalid options are never rejected.
    fn sanitized(self) -> Self {
        let base = Self::default();
        let fix = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            dt: fix(self.dt, base.dt),
            spring_length: fix(self.spring_length, base.spring_length),
            spring_strength: fix(self.spring_strength, base.spring_strength),
            repulsion_strength: fix(self.repulsion_strength, base.repulsion_strength),
            centering_strength: fix(self.centering_strength, base.centering_strength),
            damping: fix(self.damping, base.damping).min(1.0),
            max_speed: fix(self.max_speed, base.max_speed),
            max_repulsion_nodes: self.max_repulsion_nodes,
            seed: self.seed,
        }
    }
}

/// In-place steppable spring/repulsion/centering integrator.
pub struct ForceSimulation {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    pos: Vec<f64>,
    vel: Vec<f64>,
    acc: Vec<f64>,
    springs: Vec<(usize, usize)>,
    /// Public so a host can retune a running simulation.
    pub options: SimOptions,
    ticks: u64,
}

impl ForceSimulation {
    /// Build simulation state from the graph and an initial position map.
    ///
    /// Nodes missing a finite initial position get a seeded-random fallback in
    /// `[-250, 250]²`; every node is then perturbed by a small seeded jitter
    /// to break exact overlaps.
    pub fn new(graph: &KgGraph, options: SimOptions, initial: &HashMap<String, XY>) -> Self {
        let options = options.sanitized();
        let ids: Vec<String> = graph.node_ids().map(str::to_string).collect();
        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut rng = Mulberry32::new(options.seed);
        let amplitude = jitter_amplitude(ids.len());
        let mut pos = Vec::with_capacity(ids.len() * 2);
        for id in &ids {
            let (mut x, mut y) = match initial.get(id) {
                Some(p) if p.is_finite() => (p.x, p.y),
                _ => (
                    rng.next() * INITIAL_SPREAD * 2.0 - INITIAL_SPREAD,
                    rng.next() * INITIAL_SPREAD * 2.0 - INITIAL_SPREAD,
                ),
            };
            x += (rng.next() - 0.5) * amplitude;
            y += (rng.next() - 0.5) * amplitude;
            pos.push(x);
            pos.push(y);
        }

        let springs = graph
            .edges()
            .filter_map(|e| {
                let a = index.get(e.source.as_str())?;
                let b = index.get(e.target.as_str())?;
                Some((*a, *b))
            })
            .collect();

        let lanes = ids.len() * 2;
        Self {
            ids,
            index,
            pos,
            vel: vec![0.0; lanes],
            acc: vec![0.0; lanes],
            springs,
            options,
            ticks: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Accumulated integration ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the simulation by `n` integration ticks, mutating in place.
    pub fn step(&mut self, n: usize) {
        for _ in 0..n {
            self.step_once();
        }
    }

    fn step_once(&mut self) {
        let n = self.ids.len();
        if n == 0 {
            self.ticks += 1;
            return;
        }
        let o = self.options;
        self.acc.fill(0.0);

        // Pairwise repulsion, skipped wholesale on large graphs.
        if n <= o.max_repulsion_nodes {
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = self.pos[i * 2] - self.pos[j * 2];
                    let dy = self.pos[i * 2 + 1] - self.pos[j * 2 + 1];
                    let d2 = dx * dx + dy * dy + DISTANCE_EPSILON;
                    let dist = d2.sqrt();
                    let force = o.repulsion_strength / d2;
                    let fx = dx / dist * force;
                    let fy = dy / dist * force;
                    self.acc[i * 2] += fx;
                    self.acc[i * 2 + 1] += fy;
                    self.acc[j * 2] -= fx;
                    self.acc[j * 2 + 1] -= fy;
                }
            }
        }

        // Hookean springs along edges.
        for &(a, b) in &self.springs {
            let dx = self.pos[b * 2] - self.pos[a * 2];
            let dy = self.pos[b * 2 + 1] - self.pos[a * 2 + 1];
            let dist = (dx * dx + dy * dy + DISTANCE_EPSILON).sqrt();
            let force = o.spring_strength * (dist - o.spring_length);
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            self.acc[a * 2] += fx;
            self.acc[a * 2 + 1] += fy;
            self.acc[b * 2] -= fx;
            self.acc[b * 2 + 1] -= fy;
        }

        // Centering pull toward the origin keeps the cloud from drifting.
        for i in 0..n {
            self.acc[i * 2] -= o.centering_strength * self.pos[i * 2];
            self.acc[i * 2 + 1] -= o.centering_strength * self.pos[i * 2 + 1];
        }

        // Damped integration with a speed clamp.
        for i in 0..n {
            let mut vx = (self.vel[i * 2] + self.acc[i * 2] * o.dt) * o.damping;
            let mut vy = (self.vel[i * 2 + 1] + self.acc[i * 2 + 1] * o.dt) * o.damping;
            let speed = (vx * vx + vy * vy).sqrt();
            if speed > o.max_speed {
                let scale = o.max_speed / speed;
                vx *= scale;
                vy *= scale;
            }
            self.vel[i * 2] = vx;
            self.vel[i * 2 + 1] = vy;
            self.pos[i * 2] += vx * o.dt;
            self.pos[i * 2 + 1] += vy * o.dt;
        }

        self.ticks += 1;
    }

    /// Mean per-node speed; the caller's convergence signal.
    pub fn energy(&self) -> f64 {
        let n = self.ids.len();
        if n == 0 {
            return 0.0;
        }
        let total: f64 = (0..n)
            .map(|i| {
                let vx = self.vel[i * 2];
                let vy = self.vel[i * 2 + 1];
                (vx * vx + vy * vy).sqrt()
            })
            .sum();
        total / n as f64
    }

    /// Current positions as an id-keyed map.
    pub fn positions(&self) -> HashMap<String, XY> {
        self.ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), XY::new(self.pos[i * 2], self.pos[i * 2 + 1])))
            .collect()
    }

    /// Current position for one node id.
    pub fn position(&self, id: &str) -> Option<XY> {
        let i = *self.index.get(id)?;
        Some(XY::new(self.pos[i * 2], self.pos[i * 2 + 1]))
    }
}
