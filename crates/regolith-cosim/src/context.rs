use regolith_core::{Scalar, StepClock};
use regolith_rover::RoverModel;

/// Offset added to every output z so the rendered rover sits on the rendered terrain.
/// Output only; never fed back into either solver.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeightReference(pub Scalar);

impl HeightReference {
    /// Before release the rover hangs above the whole box.
    pub fn initial(box_z: Scalar, chassis_to_bottom: Scalar) -> Self {
        Self(box_z + chassis_to_bottom)
    }
    /// At release the wheels are put just on top of the settled terrain.
    pub fn on_terrain(max_particle_height: Scalar, chassis_to_bottom: Scalar) -> Self {
        Self(max_particle_height + chassis_to_bottom)
    }
    #[inline] pub fn get(self) -> Scalar { self.0 }
}

/// Everything the stepper, phase controller and recorder share.
#[derive(Clone, Debug)]
pub struct SimContext {
    pub model: RoverModel,
    pub height: HeightReference,
    pub clock: StepClock,
    pub frames: u64,
}

impl SimContext {
    pub fn new(model: RoverModel, dt: f64, box_z: Scalar) -> Self {
        let height = HeightReference::initial(box_z, model.chassis_to_bottom());
        Self { model, height, clock: StepClock::new(dt), frames: 0 }
    }
}
