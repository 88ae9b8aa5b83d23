//! Rover model builder.
//!
//! Builds the chassis and six wheels in a [`RigidSolver`](regolith_world::RigidSolver),
//! joins every wheel to the chassis with a motorised revolute joint and emits one terrain
//! [`MeshProxy`](regolith_terrain::MeshProxy) per wheel in the same order. Wheel `i` and
//! mesh `i` always describe the same body.

mod params;
mod builder;

pub use params::{RoverParams, WheelStation, WHEEL_STATIONS};
pub use builder::{build_rover, RoverModel};
