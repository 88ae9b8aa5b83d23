//! CPU soft-sphere bed.
//!
//! Equal spheres in a closed box centred on the origin, linear spring-dashpot normal
//! contacts (sphere/sphere, sphere/wall, sphere/mesh) and semi-implicit Euler. Each mesh
//! is approximated by a solid cylinder along its local Y: radius `scale.x / 2`, width
//! `scale.y`. No tangential friction and no cohesion.

use std::path::Path;

use regolith_core::{vec3, Isometry, MeshId, Scalar, Vec3, Velocity, Wrench};
use regolith_io::{csv_path, write_particles_csv, SimParams};
use tracing::{info, trace, warn};

use crate::grid::CellGrid;
use crate::solver::{MeshProxy, TerrainSolver};

#[derive(Copy, Clone, Debug)]
pub struct BedParams {
    pub radius: Scalar,
    pub density: Scalar,
    /// Full box edge lengths.
    pub box_dims: Vec3,
    pub gravity: Vec3,
    pub k_s2s: Scalar,
    pub k_s2w: Scalar,
    pub k_s2m: Scalar,
    /// Damping rates; multiplied by the effective mass of the contact.
    pub c_s2s: Scalar,
    pub c_s2w: Scalar,
    pub c_s2m: Scalar,
}

impl BedParams {
    pub fn from_sim(p: &SimParams, gravity: Vec3) -> Self {
        Self {
            radius: p.sphere_radius,
            density: p.sphere_density,
            box_dims: vec3(p.box_x, p.box_y, p.box_z),
            gravity,
            k_s2s: p.normal_stiff_s2s,
            k_s2w: p.normal_stiff_s2w,
            k_s2m: p.normal_stiff_s2m,
            c_s2s: p.normal_damp_s2s,
            c_s2w: p.normal_damp_s2w,
            c_s2m: p.normal_damp_s2m,
        }
    }

    #[inline] pub fn sphere_mass(&self) -> Scalar {
        self.density * (4.0 / 3.0) * std::f32::consts::PI * self.radius.powi(3)
    }
}

#[derive(Clone, Debug)]
struct MeshState {
    proxy: MeshProxy,
    pose: Isometry,
    vel: Velocity,
    wrench: Wrench,
}

impl MeshState {
    #[inline] fn radius(&self) -> Scalar { 0.5 * self.proxy.scale.x }
    #[inline] fn half_width(&self) -> Scalar { 0.5 * self.proxy.scale.y }
}

pub struct SoftSphereBed {
    params: BedParams,
    mass: Scalar,
    lo: Vec3,
    hi: Vec3,
    pos: Vec<Vec3>,
    vel: Vec<Vec3>,
    force: Vec<Vec3>,
    meshes: Vec<MeshState>,
    mesh_collision: bool,
    grid: CellGrid,
    initialized: bool,
    steps: u64,
}

impl SoftSphereBed {
    pub fn new(params: BedParams) -> Self {
        let half = params.box_dims * 0.5;
        Self {
            mass: params.sphere_mass(),
            lo: -half,
            hi: half,
            params,
            pos: Vec::new(),
            vel: Vec::new(),
            force: Vec::new(),
            meshes: Vec::new(),
            mesh_collision: false,
            grid: CellGrid::default(),
            initialized: false,
            steps: 0,
        }
    }

    #[inline] pub fn params(&self) -> &BedParams { &self.params }
    #[inline] pub fn positions(&self) -> &[Vec3] { &self.pos }
    #[inline] pub fn velocities(&self) -> &[Vec3] { &self.vel }
    #[inline] pub fn particle_mass(&self) -> Scalar { self.mass }
    #[inline] pub fn mesh_collision(&self) -> bool { self.mesh_collision }
    #[inline] pub fn steps(&self) -> u64 { self.steps }

    fn pair_forces(&mut self) {
        let r = self.params.radius;
        let (k, c) = (self.params.k_s2s, self.params.c_s2s);
        let m_eff = 0.5 * self.mass;
        let (pos, vel, force) = (&self.pos, &self.vel, &mut self.force);
        self.grid.for_each_pair(pos, |i, j| {
            let d = pos[i] - pos[j];
            let dist2 = d.length_squared();
            if dist2 >= 4.0 * r * r || dist2 <= 1e-12 {
                return;
            }
            let dist = dist2.sqrt();
            let n = d / dist;
            let vn = (vel[i] - vel[j]).dot(n);
            let f = k * (2.0 * r - dist) - c * m_eff * vn;
            if f > 0.0 {
                force[i] += n * f;
                force[j] -= n * f;
            }
        });
    }

    fn wall_forces(&mut self) {
        let r = self.params.radius;
        let (k, c, m) = (self.params.k_s2w, self.params.c_s2w, self.mass);
        for ((p, v), f) in self.pos.iter().zip(&self.vel).zip(self.force.iter_mut()) {
            for a in 0..3 {
                let pen_lo = self.lo[a] + r - p[a];
                if pen_lo > 0.0 {
                    let mag = k * pen_lo - c * m * v[a];
                    if mag > 0.0 { f[a] += mag; }
                }
                let pen_hi = p[a] + r - self.hi[a];
                if pen_hi > 0.0 {
                    let mag = k * pen_hi + c * m * v[a];
                    if mag > 0.0 { f[a] -= mag; }
                }
            }
        }
    }

    fn mesh_forces(&mut self) {
        let r = self.params.radius;
        let (k, c, m) = (self.params.k_s2m, self.params.c_s2m, self.mass);
        for mesh in &mut self.meshes {
            let (rad, hw) = (mesh.radius(), mesh.half_width());
            let reach = (rad * rad + hw * hw).sqrt() + r;
            for ((p, v), f) in self.pos.iter().zip(&self.vel).zip(self.force.iter_mut()) {
                if p.distance_squared(mesh.pose.pos) > reach * reach {
                    continue;
                }
                let Some((n, pen, cp)) = sphere_cylinder(*p, r, &mesh.pose, rad, hw) else { continue };
                let arm = cp - mesh.pose.pos;
                let v_mesh = mesh.vel.lin + mesh.vel.ang.cross(arm);
                let vn = (*v - v_mesh).dot(n);
                let mag = k * pen - c * m * vn;
                if mag <= 0.0 {
                    continue;
                }
                *f += n * mag;
                mesh.wrench.force -= n * mag;
                mesh.wrench.torque += arm.cross(-n * mag);
            }
        }
    }
}

/// Contact of a sphere with a solid cylinder along the pose's local Y.
/// Returns the world normal (cylinder to sphere), the penetration depth and the contact
/// point on the cylinder surface.
fn sphere_cylinder(p: Vec3, r: Scalar, pose: &Isometry, rad: Scalar, half_w: Scalar) -> Option<(Vec3, Scalar, Vec3)> {
    let q = pose.rot.inverse() * (p - pose.pos);
    let radial = vec3(q.x, 0.0, q.z);
    let rho = radial.length();
    let (n, pen, surf) = if rho <= rad && q.y.abs() <= half_w {
        // centre inside: leave through the nearest face
        let to_side = rad - rho;
        let to_cap = half_w - q.y.abs();
        if to_cap < to_side {
            let s = if q.y < 0.0 { -1.0 } else { 1.0 };
            (vec3(0.0, s, 0.0), r + to_cap, vec3(q.x, s * half_w, q.z))
        } else {
            let dir = if rho > 1e-6 { radial / rho } else { Vec3::X };
            (dir, r + to_side, dir * rad + vec3(0.0, q.y, 0.0))
        }
    } else {
        let surf = radial.clamp_length_max(rad) + vec3(0.0, q.y.clamp(-half_w, half_w), 0.0);
        let d = q - surf;
        let dist = d.length();
        if dist >= r || dist <= 1e-9 {
            return None;
        }
        (d / dist, r - dist, surf)
    };
    Some((pose.transform_vector(n), pen, pose.transform_point(surf)))
}

impl TerrainSolver for SoftSphereBed {
    fn set_particle_positions(&mut self, positions: Vec<Vec3>) {
        self.vel = vec![Vec3::ZERO; positions.len()];
        self.force = vec![Vec3::ZERO; positions.len()];
        self.pos = positions;
    }

    fn num_particles(&self) -> usize { self.pos.len() }

    fn load_meshes(&mut self, meshes: &[MeshProxy]) {
        for proxy in meshes {
            self.meshes.push(MeshState {
                pose: Isometry { pos: proxy.translation, ..Isometry::IDENTITY },
                proxy: proxy.clone(),
                vel: Velocity::default(),
                wrench: Wrench::ZERO,
            });
        }
        info!(meshes = self.meshes.len(), "terrain meshes loaded");
    }

    fn num_meshes(&self) -> usize { self.meshes.len() }

    fn enable_mesh_collision(&mut self, on: bool) { self.mesh_collision = on; }

    fn initialize(&mut self) {
        self.grid = CellGrid::new(self.lo, self.hi, 2.0 * self.params.radius);
        self.initialized = true;
        info!(
            particles = self.pos.len(),
            meshes = self.meshes.len(),
            mesh_collision = self.mesh_collision,
            particle_mass = self.mass,
            "soft-sphere bed initialized"
        );
    }

    fn apply_mesh_motion(&mut self, mesh: MeshId, pose: Isometry, vel: Velocity) {
        match self.meshes.get_mut(mesh.index()) {
            Some(m) => { m.pose = pose; m.vel = vel; }
            None => warn!(%mesh, "motion for unknown mesh ignored"),
        }
    }

    fn advance(&mut self, dt: f64) {
        if !self.initialized {
            self.initialize();
        }
        let dt = dt as Scalar;
        let weight = self.params.gravity * self.mass;
        self.force.iter_mut().for_each(|f| *f = weight);
        self.meshes.iter_mut().for_each(|m| m.wrench = Wrench::ZERO);

        self.grid.rebuild(&self.pos);
        self.pair_forces();
        self.wall_forces();
        if self.mesh_collision {
            self.mesh_forces();
        }

        let inv_m = 1.0 / self.mass;
        for ((p, v), f) in self.pos.iter_mut().zip(self.vel.iter_mut()).zip(&self.force) {
            *v += *f * (inv_m * dt);
            *p += *v * dt;
        }
        self.steps += 1;
        trace!(step = self.steps, "terrain advanced");
    }

    fn collect_mesh_contact(&self, mesh: MeshId) -> Wrench {
        self.meshes.get(mesh.index()).map_or(Wrench::ZERO, |m| m.wrench)
    }

    fn max_particle_height(&self) -> Scalar {
        self.pos.iter().map(|p| p.z).reduce(Scalar::max).unwrap_or(self.lo.z)
    }

    fn write_snapshot(&self, base: &Path) -> anyhow::Result<()> {
        let speeds: Vec<Scalar> = self.vel.iter().map(|v| v.length()).collect();
        write_particles_csv(&csv_path(base), &self.pos, &speeds)
    }
}
