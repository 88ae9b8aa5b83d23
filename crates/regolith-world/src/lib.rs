//! Rigid multibody side of the co-simulation.
//!
//! `RigidSolver` is the seam the orchestrator drives; `RoverSystem` is the in-tree solver
//! behind it: a body arena, revolute joints with angle motors, uniform gravity and a
//! semi-implicit Euler step.

mod solver;
mod system;

pub use solver::RigidSolver;
pub use system::{RoverSystem, WorldBuilder};

pub use regolith_articulation::{AngleFunction, RevoluteJoint};
pub use regolith_dynamics::BodyDesc;
