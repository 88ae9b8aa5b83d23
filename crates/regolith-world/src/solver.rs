use regolith_articulation::{AngleFunction, RevoluteJoint};
use regolith_core::{BodyId, Isometry, JointId, Vec3, Velocity, Wrench};
use regolith_geom::MassProps;
use regolith_dynamics::BodyDesc;

/// What the co-simulation expects from a rigid-body solver.
///
/// Body and joint ids are insertion indices and stay valid for the whole run.
pub trait RigidSolver {
    fn add_body(&mut self, desc: BodyDesc) -> BodyId;
    fn add_revolute(&mut self, joint: RevoluteJoint) -> JointId;
    /// Drive an existing revolute joint with a prescribed angle.
    fn add_angle_motor(&mut self, joint: JointId, f: AngleFunction) -> Option<JointId>;

    fn mass_props(&self, id: BodyId) -> MassProps;
    fn set_mass_props(&mut self, id: BodyId, mass: MassProps);
    fn pose(&self, id: BodyId) -> Isometry;
    fn set_pose(&mut self, id: BodyId, pose: Isometry);
    fn vel(&self, id: BodyId) -> Velocity;
    fn set_vel(&mut self, id: BodyId, vel: Velocity);

    fn is_fixed(&self, id: BodyId) -> bool;
    fn set_fixed(&mut self, id: BodyId, fixed: bool);

    fn empty_accumulators(&mut self, id: BodyId);
    /// World-space force applied at a world-space point.
    fn accumulate_force(&mut self, id: BodyId, force: Vec3, point: Vec3);
    fn accumulate_torque(&mut self, id: BodyId, torque: Vec3);
    fn accumulated(&self, id: BodyId) -> Wrench;

    fn gravity(&self) -> Vec3;
    fn set_gravity(&mut self, g: Vec3);

    /// Advance by exactly one fixed step using whatever is currently accumulated.
    fn do_step(&mut self, dt: f64);
    fn time(&self) -> f64;
}
