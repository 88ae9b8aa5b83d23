use regolith_terrain::TerrainSolver;
use regolith_world::RigidSolver;
use tracing::info;

use crate::context::{HeightReference, SimContext};

/// Simulated time at which the chassis is let go.
pub const RELEASE_TIME: f64 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChassisState {
    Fixed,
    Free { step: u64, time: f64 },
}

/// One-shot chassis release. The same in both run modes.
#[derive(Clone, Debug)]
pub struct PhaseController {
    pub release_time: f64,
    state: ChassisState,
}

impl Default for PhaseController {
    fn default() -> Self { Self { release_time: RELEASE_TIME, state: ChassisState::Fixed } }
}

impl PhaseController {
    #[inline] pub fn state(&self) -> ChassisState { self.state }

    /// Called at the top of every iteration. Returns true on the iteration that releases.
    pub fn observe<R: RigidSolver, T: TerrainSolver>(
        &mut self,
        rigid: &mut R,
        terrain: &T,
        ctx: &mut SimContext,
    ) -> bool {
        let t = ctx.clock.time();
        if self.state != ChassisState::Fixed || t < self.release_time {
            return false;
        }
        rigid.set_fixed(ctx.model.chassis(), false);
        let max_z = terrain.max_particle_height();
        ctx.height = HeightReference::on_terrain(max_z, ctx.model.chassis_to_bottom());
        self.state = ChassisState::Free { step: ctx.clock.step(), time: t };
        info!(step = ctx.clock.step(), t, terrain_max = max_z, height_offset = ctx.height.get(), "chassis released");
        true
    }
}
