use regolith_articulation::{AngleFunction, Joints, RevoluteJoint};
use regolith_core::{BodyId, Isometry, JointId, Scalar, Vec3, Velocity, Wrench, StepHasher};
use regolith_dynamics::{Bodies, BodyDesc};
use regolith_geom::MassProps;
use tracing::trace;

use crate::RigidSolver;

/* ---------------- Builder ---------------- */
pub struct WorldBuilder {
    pub bodies: usize,
    pub gravity: Vec3,
}
impl WorldBuilder {
    pub fn new() -> Self { Self { bodies: 8, gravity: Vec3::new(0.0, 0.0, -9.81) } }

    pub fn with_capacity(mut self, bodies: usize) -> Self {
        self.bodies = bodies;
        self
    }
    pub fn with_gravity(mut self, g: Vec3) -> Self {
        self.gravity = g;
        self
    }

    pub fn build(self) -> RoverSystem {
        RoverSystem {
            gravity: self.gravity,
            bodies: Bodies::with_capacity(self.bodies),
            joints: Joints::new(),
            time: 0.0,
            tick: 0,
        }
    }
}

impl Default for WorldBuilder {
    fn default() -> Self { Self::new() }
}

/* ---------------- RoverSystem ---------------- */
/// Reference rigid solver: root bodies are integrated as composites of themselves plus every
/// body jointed to them; jointed children are then placed kinematically by the joints.
pub struct RoverSystem {
    gravity: Vec3,
    bodies: Bodies,
    joints: Joints,
    time: f64,
    tick: u64,
}

impl RoverSystem {
    #[inline] pub fn num_bodies(&self) -> u32 { self.bodies.len() as u32 }
    #[inline] pub fn tick_index(&self) -> u64 { self.tick }
    pub fn joint_angle(&self, id: JointId) -> Option<Scalar> { self.joints.angle(id) }

    /// Mass, inertia and external wrench of `root` with its jointed children folded in.
    /// Child weight is carried by the composite mass, so only contact loads are summed here.
    fn composite(&self, root: BodyId) -> (MassProps, Wrench) {
        let own = self.bodies.mass_props(root.0);
        let root_pos = self.bodies.pose(root.0).pos;
        let mut mass = own.mass;
        let mut inertia = own.inertia;
        let mut ext = self.bodies.accumulated(root.0);

        for j in self.joints.joints_of(root) {
            let cm = self.bodies.mass_props(j.child.0);
            let r = j.frame.pos; // parent-local offset
            mass += cm.mass;
            inertia += cm.inertia + Vec3::new(r.y*r.y + r.z*r.z, r.x*r.x + r.z*r.z, r.x*r.x + r.y*r.y) * cm.mass;

            let cw = self.bodies.accumulated(j.child.0);
            let arm = self.bodies.pose(j.child.0).pos - root_pos;
            ext.force += cw.force;
            ext.torque += cw.torque + arm.cross(cw.force);
        }
        (MassProps::new(mass, inertia), ext)
    }

    /// Deterministic digest of every body pose, in id order.
    pub fn state_hash(&self) -> [u8; 32] {
        let mut h = StepHasher::new();
        h.u64(self.tick);
        for i in self.bodies.indices() {
            h.pose(&self.bodies.pose(i));
        }
        h.finalize()
    }
}

impl RigidSolver for RoverSystem {
    fn add_body(&mut self, desc: BodyDesc) -> BodyId { BodyId(self.bodies.add(desc)) }
    fn add_revolute(&mut self, joint: RevoluteJoint) -> JointId { self.joints.add_revolute(joint) }
    fn add_angle_motor(&mut self, joint: JointId, f: AngleFunction) -> Option<JointId> {
        self.joints.add_angle_motor(joint, f)
    }

    fn mass_props(&self, id: BodyId) -> MassProps { self.bodies.mass_props(id.0) }
    fn set_mass_props(&mut self, id: BodyId, mass: MassProps) { self.bodies.set_mass_props(id.0, mass) }
    fn pose(&self, id: BodyId) -> Isometry { self.bodies.pose(id.0) }
    fn set_pose(&mut self, id: BodyId, pose: Isometry) { self.bodies.set_pose(id.0, pose) }
    fn vel(&self, id: BodyId) -> Velocity { self.bodies.vel(id.0) }
    fn set_vel(&mut self, id: BodyId, vel: Velocity) { self.bodies.set_vel(id.0, vel) }

    fn is_fixed(&self, id: BodyId) -> bool { self.bodies.is_fixed(id.0) }
    fn set_fixed(&mut self, id: BodyId, fixed: bool) { self.bodies.set_fixed(id.0, fixed) }

    fn empty_accumulators(&mut self, id: BodyId) { self.bodies.empty_accumulators(id.0) }
    fn accumulate_force(&mut self, id: BodyId, force: Vec3, point: Vec3) {
        self.bodies.accumulate_force(id.0, force, point)
    }
    fn accumulate_torque(&mut self, id: BodyId, torque: Vec3) { self.bodies.accumulate_torque(id.0, torque) }
    fn accumulated(&self, id: BodyId) -> Wrench { self.bodies.accumulated(id.0) }

    fn gravity(&self) -> Vec3 { self.gravity }
    fn set_gravity(&mut self, g: Vec3) { self.gravity = g; }

    fn do_step(&mut self, dt: f64) {
        let h = dt as Scalar;
        for i in 0..self.bodies.len() as u32 {
            let id = BodyId(i);
            if self.joints.is_child(id) { continue; }
            let (mass, ext) = self.composite(id);
            self.bodies.integrate_with_mass(i, mass, self.gravity, ext, h);
        }
        self.time += dt;
        self.tick = self.tick.wrapping_add(1);
        self.joints.solve(&mut self.bodies, self.time, h);
        trace!(tick = self.tick, t = self.time, "rigid step");
    }

    fn time(&self) -> f64 { self.time }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regolith_core::{vec3, iso, quat_identity};

    fn chassis_with_wheel(fixed: bool) -> (RoverSystem, BodyId, BodyId, JointId) {
        let mut w = WorldBuilder::new().with_gravity(vec3(0.0, 0.0, -10.0)).build();
        let c = w.add_body(BodyDesc {
            pose: iso(Vec3::ZERO, quat_identity()), vel: Velocity::default(),
            mass: MassProps::from_box(10.0, vec3(2.0, 2.0, 1.0)), fixed,
        });
        let wheel = w.add_body(BodyDesc {
            pose: iso(vec3(1.0, 1.0, -0.5), quat_identity()), vel: Velocity::default(),
            mass: MassProps::from_cylinder_y(1.0, 0.3, 0.2), fixed: false,
        });
        let j = w.add_revolute(RevoluteJoint { parent: c, child: wheel, frame: iso(vec3(1.0, 1.0, -0.5), quat_identity()) });
        w.add_angle_motor(j, AngleFunction::Ramp { y0: 0.0, slope: core::f32::consts::PI });
        (w, c, wheel, j)
    }

    #[test] fn fixed_chassis_holds_wheel_in_place_while_it_spins() {
        let (mut w, c, wheel, j) = chassis_with_wheel(true);
        for _ in 0..10 { w.do_step(0.01); }
        assert_eq!(w.pose(c).pos, Vec3::ZERO);
        assert!((w.pose(wheel).pos - vec3(1.0, 1.0, -0.5)).length() < 1e-6);
        assert!((w.joint_angle(j).unwrap() - 0.1 * core::f32::consts::PI).abs() < 1e-5);
    }

    #[test] fn released_chassis_falls_with_its_wheels() {
        let (mut w, c, wheel, _) = chassis_with_wheel(true);
        w.set_fixed(c, false);
        w.do_step(0.1);
        assert!((w.vel(c).lin.z + 1.0).abs() < 1e-5);
        assert!((w.pose(wheel).pos.z - (w.pose(c).pos.z - 0.5)).abs() < 1e-5);
    }

    #[test] fn wheel_contact_force_pushes_free_chassis() {
        let (mut w, c, wheel, _) = chassis_with_wheel(false);
        w.set_gravity(Vec3::ZERO);
        let p = w.pose(wheel).pos;
        w.accumulate_force(wheel, vec3(11.0, 0.0, 0.0), p);
        w.do_step(0.1);
        // composite mass 11 → a = 1
        assert!((w.vel(c).lin.x - 0.1).abs() < 1e-5);
    }

    #[test] fn same_inputs_same_hash() {
        let (mut a, ..) = chassis_with_wheel(false);
        let (mut b, ..) = chassis_with_wheel(false);
        for _ in 0..20 { a.do_step(0.01); b.do_step(0.01); }
        assert_eq!(a.state_hash(), b.state_hash());
    }
}
