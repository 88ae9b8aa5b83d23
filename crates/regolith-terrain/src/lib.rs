//! Granular terrain side of the co-simulation.
//!
//! [`TerrainSolver`] is the seam the stepper drives. [`TerrainInit`] produces the initial
//! particle positions (layered Poisson-disk fill or a checkpoint). [`SoftSphereBed`] is a
//! small CPU reference solver used by the binary and the tests.

mod solver;
mod sampler;
mod init;
mod grid;
mod bed;

pub use solver::{MeshProxy, TerrainSolver};
pub use sampler::{poisson_disk_2d, LayerSampler, SAMPLER_PADDING};
pub use init::{settling_region, TerrainInit};
pub use bed::{BedParams, SoftSphereBed};
