use glam::{Vec3A, Mat3A, Quat};
use crate::Scalar;

pub type Vec3 = Vec3A;
pub type Mat3 = Mat3A;

#[inline] pub fn vec3(x: Scalar, y: Scalar, z: Scalar) -> Vec3 { Vec3::new(x, y, z) }
#[inline] pub fn iso(pos: Vec3, rot: Quat) -> Isometry { Isometry { pos, rot } }
#[inline] pub fn quat_identity() -> Quat { Quat::IDENTITY }

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Isometry { pub pos: Vec3, pub rot: Quat }

impl Default for Isometry {
    fn default() -> Self { Self::IDENTITY }
}

impl Isometry {
    pub const IDENTITY: Isometry = Isometry { pos: Vec3::ZERO, rot: Quat::IDENTITY };

    /// Map a point from the local frame to world.
    #[inline] pub fn transform_point(&self, p: Vec3) -> Vec3 { self.pos + self.rot * p }
    #[inline] pub fn transform_vector(&self, v: Vec3) -> Vec3 { self.rot * v }

    /// Local x/y/z axes expressed in world (rotation matrix columns).
    pub fn basis(&self) -> [Vec3; 3] {
        let m = Mat3::from_quat(self.rot);
        [m.x_axis, m.y_axis, m.z_axis]
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity { pub lin: Vec3, pub ang: Vec3 }

/// Force + torque pair, world frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Wrench { pub force: Vec3, pub torque: Vec3 }

impl Wrench {
    pub const ZERO: Wrench = Wrench { force: Vec3::ZERO, torque: Vec3::ZERO };
    #[inline] pub fn new(force: Vec3, torque: Vec3) -> Self { Self { force, torque } }
}

impl core::ops::AddAssign for Wrench {
    fn add_assign(&mut self, rhs: Self) {
        self.force += rhs.force;
        self.torque += rhs.torque;
    }
}
