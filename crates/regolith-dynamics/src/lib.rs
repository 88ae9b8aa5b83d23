use regolith_core::types::{Isometry, Mat3, Velocity, Vec3, Wrench};
use regolith_core::{Scalar, Quat};
use regolith_geom::MassProps;

/// Input descriptor when creating a body.
#[derive(Copy, Clone, Debug)]
pub struct BodyDesc {
    pub pose: Isometry,
    pub vel: Velocity,
    pub mass: MassProps,
    pub fixed: bool,
}

/// SoA body storage with deterministic ID = index semantics.
pub struct Bodies {
    pos: Vec<Vec3>,
    rot: Vec<Quat>,
    linvel: Vec<Vec3>,
    angvel: Vec<Vec3>,
    mass: Vec<MassProps>,
    fixed: Vec<bool>,
    // contact force/torque collected from outside the solver; cleared by the owner, never by step
    acc_force: Vec<Vec3>,
    acc_torque: Vec<Vec3>,
}

impl Bodies {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            pos:        Vec::with_capacity(cap),
            rot:        Vec::with_capacity(cap),
            linvel:     Vec::with_capacity(cap),
            angvel:     Vec::with_capacity(cap),
            mass:       Vec::with_capacity(cap),
            fixed:      Vec::with_capacity(cap),
            acc_force:  Vec::with_capacity(cap),
            acc_torque: Vec::with_capacity(cap),
        }
    }

    pub fn add(&mut self, desc: BodyDesc) -> u32 {
        self.pos.push(desc.pose.pos);
        self.rot.push(desc.pose.rot);
        self.linvel.push(desc.vel.lin);
        self.angvel.push(desc.vel.ang);
        self.mass.push(desc.mass);
        self.fixed.push(desc.fixed);
        self.acc_force.push(Vec3::ZERO);
        self.acc_torque.push(Vec3::ZERO);
        (self.pos.len() as u32) - 1
    }

    #[inline] pub fn len(&self) -> usize { self.pos.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.pos.is_empty() }

    // -------- Accessors --------
    #[inline] pub fn pose(&self, id: u32) -> Isometry {
        let i = id as usize;
        Isometry { pos: self.pos[i], rot: self.rot[i] }
    }
    #[inline] pub fn set_pose(&mut self, id: u32, iso: Isometry) {
        let i = id as usize;
        self.pos[i] = iso.pos;
        self.rot[i] = iso.rot;
    }

    #[inline] pub fn vel(&self, id: u32) -> Velocity {
        let i = id as usize;
        Velocity { lin: self.linvel[i], ang: self.angvel[i] }
    }
    #[inline] pub fn set_vel(&mut self, id: u32, v: Velocity) {
        let i = id as usize;
        self.linvel[i] = v.lin;
        self.angvel[i] = v.ang;
    }

    #[inline] pub fn mass_props(&self, id: u32) -> MassProps { self.mass[id as usize] }
    #[inline] pub fn set_mass_props(&mut self, id: u32, m: MassProps) { self.mass[id as usize] = m; }
    #[inline] pub fn inv_mass_of(&self, id: u32) -> Scalar { self.mass[id as usize].inv_mass }

    #[inline] pub fn is_fixed(&self, id: u32) -> bool { self.fixed[id as usize] }
    /// Fixing a body also zeroes its velocity so it does not resume with stale motion.
    pub fn set_fixed(&mut self, id: u32, fixed: bool) {
        let i = id as usize;
        self.fixed[i] = fixed;
        if fixed {
            self.linvel[i] = Vec3::ZERO;
            self.angvel[i] = Vec3::ZERO;
        }
    }

    // -------- Force accumulators --------
    pub fn empty_accumulators(&mut self, id: u32) {
        let i = id as usize;
        self.acc_force[i] = Vec3::ZERO;
        self.acc_torque[i] = Vec3::ZERO;
    }
    /// Add a world-space force applied at a world-space point. Off-centre points add torque.
    pub fn accumulate_force(&mut self, id: u32, force: Vec3, point: Vec3) {
        let i = id as usize;
        self.acc_force[i] += force;
        self.acc_torque[i] += (point - self.pos[i]).cross(force);
    }
    pub fn accumulate_torque(&mut self, id: u32, torque: Vec3) {
        self.acc_torque[id as usize] += torque;
    }
    #[inline] pub fn accumulated(&self, id: u32) -> Wrench {
        let i = id as usize;
        Wrench { force: self.acc_force[i], torque: self.acc_torque[i] }
    }

    // -------- Integration --------
    /// Semi-implicit Euler for one body under gravity plus an external wrench.
    /// Fixed bodies and bodies with infinite mass are left untouched.
    pub fn integrate(&mut self, id: u32, gravity: Vec3, ext: Wrench, dt: Scalar) {
        let m = self.mass[id as usize];
        self.integrate_with_mass(id, m, gravity, ext, dt);
    }

    /// Same as `integrate` but with caller-supplied mass properties, e.g. a composite of the
    /// body and everything jointed to it.
    pub fn integrate_with_mass(&mut self, id: u32, m: MassProps, gravity: Vec3, ext: Wrench, dt: Scalar) {
        let i = id as usize;
        if self.fixed[i] || m.inv_mass == 0.0 { return; }

        // world-space inverse inertia: R * I^-1_local * R^T
        let r = Mat3::from_quat(self.rot[i]);
        let inv_i_w = r * m.inv_inertia_local() * r.transpose();
        self.linvel[i] += (gravity + ext.force * m.inv_mass) * dt;
        self.angvel[i] += inv_i_w * ext.torque * dt;
        self.pos[i] += self.linvel[i] * dt;
        self.apply_orientation_delta(id, self.angvel[i] * dt);
    }

    /// Small-angle orientation update (world space).
    pub fn apply_orientation_delta(&mut self, id: u32, dtheta_world: Vec3) {
        let i = id as usize;
        let ang2 = dtheta_world.length_squared();
        if ang2 <= 0.0 { return; }
        let dq = Quat::from_xyzw(dtheta_world.x * 0.5, dtheta_world.y * 0.5, dtheta_world.z * 0.5, 1.0).normalize();
        self.rot[i] = (dq * self.rot[i]).normalize();
    }

    // Iterator for hashing in stable order
    pub fn indices(&self) -> impl ExactSizeIterator<Item=u32> + '_ {
        0..(self.len() as u32)
    }
}

impl Default for Bodies {
    fn default() -> Self { Self::with_capacity(0) }
}
