use std::path::Path;

use regolith_core::{Isometry, MeshId, Scalar, Vec3, Velocity, Wrench};

/// Boundary mesh handed to the terrain solver. Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshProxy {
    pub filename: String,
    pub scale: Vec3,
    pub translation: Vec3,
    pub mass: Scalar,
}

impl MeshProxy {
    pub fn new(filename: impl Into<String>, scale: Vec3, translation: Vec3, mass: Scalar) -> Self {
        Self { filename: filename.into(), scale, translation, mass }
    }
}

/// What the stepper needs from a granular solver.
///
/// Meshes are addressed by their position in the list passed to [`load_meshes`]; that
/// index is the `MeshId`.
///
/// [`load_meshes`]: TerrainSolver::load_meshes
pub trait TerrainSolver {
    fn set_particle_positions(&mut self, positions: Vec<Vec3>);
    fn num_particles(&self) -> usize;

    fn load_meshes(&mut self, meshes: &[MeshProxy]);
    fn num_meshes(&self) -> usize;
    fn enable_mesh_collision(&mut self, on: bool);

    /// Finish setup. Called once, after particles and meshes are in place.
    fn initialize(&mut self);

    /// Kinematic state of a mesh for the next advance.
    fn apply_mesh_motion(&mut self, mesh: MeshId, pose: Isometry, vel: Velocity);
    fn advance(&mut self, dt: f64);
    /// Contact force and torque (about the mesh origin) the particles exerted on a mesh
    /// during the last advance.
    fn collect_mesh_contact(&self, mesh: MeshId) -> Wrench;

    fn max_particle_height(&self) -> Scalar;

    /// Write the particle state to `<base>.csv`.
    fn write_snapshot(&self, base: &Path) -> anyhow::Result<()>;
}
