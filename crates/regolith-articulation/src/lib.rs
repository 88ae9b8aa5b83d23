use regolith_core::types::{Isometry, Velocity, Vec3};
use regolith_core::{BodyId, JointId, Quat, Scalar};
use regolith_dynamics::Bodies;

/// Prescribed joint angle as a function of simulated time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AngleFunction {
    Constant(Scalar),
    /// `y0 + slope * t`
    Ramp { y0: Scalar, slope: Scalar },
}

impl AngleFunction {
    #[inline] pub fn value(&self, t: f64) -> Scalar {
        match *self {
            AngleFunction::Constant(a) => a,
            AngleFunction::Ramp { y0, slope } => y0 + slope * t as Scalar,
        }
    }
    #[inline] pub fn rate(&self, _t: f64) -> Scalar {
        match *self {
            AngleFunction::Constant(_) => 0.0,
            AngleFunction::Ramp { slope, .. } => slope,
        }
    }
}

/// One rotational DOF between `parent` and `child` about the joint frame's local Y axis.
/// The child's centre of mass sits at the joint origin.
#[derive(Copy, Clone, Debug)]
pub struct RevoluteJoint {
    pub parent: BodyId,
    pub child: BodyId,
    /// Joint frame expressed in the parent's local frame.
    pub frame: Isometry,
}

#[derive(Copy, Clone, Debug)]
struct JointState {
    j: RevoluteJoint,
    angle: Scalar,
    rate: Scalar,
    motor: Option<AngleFunction>,
}

#[derive(Default)]
pub struct Joints {
    revolute: Vec<JointState>,
}

impl Joints {
    pub fn new() -> Self { Self { revolute: Vec::new() } }

    pub fn add_revolute(&mut self, j: RevoluteJoint) -> JointId {
        self.revolute.push(JointState { j, angle: 0.0, rate: 0.0, motor: None });
        JointId((self.revolute.len() as u32) - 1)
    }

    /// Attach a rotation-angle motor. The motor overrides the joint's own dynamics for the
    /// rest of the run. Returns `None` for an unknown joint.
    pub fn add_angle_motor(&mut self, id: JointId, f: AngleFunction) -> Option<JointId> {
        let js = self.revolute.get_mut(id.0 as usize)?;
        js.motor = Some(f);
        Some(id)
    }

    #[inline] pub fn len(&self) -> usize { self.revolute.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.revolute.is_empty() }
    pub fn joint(&self, id: JointId) -> Option<&RevoluteJoint> { self.revolute.get(id.0 as usize).map(|s| &s.j) }
    pub fn angle(&self, id: JointId) -> Option<Scalar> { self.revolute.get(id.0 as usize).map(|s| s.angle) }
    pub fn motor(&self, id: JointId) -> Option<AngleFunction> { self.revolute.get(id.0 as usize).and_then(|s| s.motor) }

    /// True if `body` is the child of any joint; such bodies are not integrated on their own.
    pub fn is_child(&self, body: BodyId) -> bool {
        self.revolute.iter().any(|s| s.j.child == body)
    }

    /// Joints hanging off `parent`, in insertion order.
    pub fn joints_of(&self, parent: BodyId) -> impl Iterator<Item = &RevoluteJoint> + '_ {
        self.revolute.iter().filter(move |s| s.j.parent == parent).map(|s| &s.j)
    }

    /// Advance free joint angles, then place every child rigidly on its parent.
    ///
    /// `t` is the simulated time at the end of the step. Motorised joints take their angle and
    /// rate straight from the motor function; free joints integrate the child's axle torque.
    pub fn solve(&mut self, bodies: &mut Bodies, t: f64, dt: Scalar) {
        for s in &mut self.revolute {
            let (ip, ic) = (s.j.parent.0, s.j.child.0);
            let parent = bodies.pose(ip);
            let pvel = bodies.vel(ip);
            let joint_w = Isometry {
                pos: parent.transform_point(s.j.frame.pos),
                rot: (parent.rot * s.j.frame.rot).normalize(),
            };
            let axis_w = joint_w.rot * Vec3::Y;

            match s.motor {
                Some(f) => {
                    s.angle = f.value(t);
                    s.rate = f.rate(t);
                }
                None => {
                    let i_axle = bodies.mass_props(ic).inertia.y;
                    if i_axle > 0.0 && !bodies.is_fixed(ic) {
                        s.rate += bodies.accumulated(ic).torque.dot(axis_w) / i_axle * dt;
                    }
                    s.angle += s.rate * dt;
                }
            }

            let spin = Quat::from_rotation_y(s.angle);
            bodies.set_pose(ic, Isometry { pos: joint_w.pos, rot: (joint_w.rot * spin).normalize() });
            let r = joint_w.pos - parent.pos;
            bodies.set_vel(ic, Velocity {
                lin: pvel.lin + pvel.ang.cross(r),
                ang: pvel.ang + axis_w * s.rate,
            });
        }
    }
}
