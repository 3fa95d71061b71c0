//! # KG Layout
//!
//! Deterministic 2D layouts and an iterative force simulation for knowledge
//! graphs built by `kg-graph`.
//!
//! ## Architecture
//!
//! ```text
//! KgGraph
//!     │
//!     ├──> Layout Engine (one-shot, pure)
//!     │      ├─ grid    — square-ish grid over sorted ids
//!     │      ├─ circle  — even ring, seed-derived start angle
//!     │      ├─ radial  — BFS rings from the max-degree roots
//!     │      └─ force   — radial base + seeded jitter
//!     │
//!     └──> Force Simulation (iterative, caller-driven)
//!            ├─ flat pos/vel/acc buffers in fixed id order
//!            ├─ repulsion + springs + centering per step
//!            └─ mean-speed energy as a convergence signal
//! ```
//!
//! Everything is reproducible from a 32-bit seed; saved layouts from existing
//! sessions depend on the exact constants in here, so they are preserved
//! verbatim rather than re-tuned.

mod rng;
mod layouts;
mod sim;

pub use rng::{hash_string_to_seed, Mulberry32};
pub use layouts::{
    circle_layout, complete_positions, compute_layout, force_layout, grid_layout, jitter_amplitude,
    radial_layout, LayoutKind, LayoutOptions,
};
pub use sim::{ForceSimulation, SimOptions};
