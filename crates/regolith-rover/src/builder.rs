use regolith_core::{iso, quat_identity, BodyId, JointId, MeshId, Vec3, Velocity};
use regolith_geom::MassProps;
use regolith_terrain::MeshProxy;
use regolith_world::{AngleFunction, BodyDesc, RevoluteJoint, RigidSolver};
use tracing::info;

use crate::params::{RoverParams, WHEEL_STATIONS};

/// Ids of the rover inside a rigid solver plus the terrain meshes that mirror its wheels.
///
/// `wheels()[i]` and `meshes()[i]` are the same physical wheel; the order never changes.
#[derive(Clone, Debug)]
pub struct RoverModel {
    chassis: BodyId,
    wheels: Vec<BodyId>,
    joints: Vec<JointId>,
    meshes: Vec<MeshProxy>,
    chassis_mesh: MeshProxy,
    chassis_to_bottom: f32,
}

impl RoverModel {
    #[inline] pub fn chassis(&self) -> BodyId { self.chassis }
    #[inline] pub fn wheels(&self) -> &[BodyId] { &self.wheels }
    #[inline] pub fn joints(&self) -> &[JointId] { &self.joints }
    #[inline] pub fn meshes(&self) -> &[MeshProxy] { &self.meshes }
    #[inline] pub fn chassis_mesh(&self) -> &MeshProxy { &self.chassis_mesh }
    #[inline] pub fn chassis_to_bottom(&self) -> f32 { self.chassis_to_bottom }

    /// Wheel body paired with each terrain mesh.
    pub fn wheel_meshes(&self) -> impl Iterator<Item = (BodyId, MeshId)> + '_ {
        self.wheels.iter().enumerate().map(|(i, &b)| (b, MeshId(i as u32)))
    }
}

/// Create the fixed chassis at `chassis_pos` and the six driven wheels.
pub fn build_rover<R: RigidSolver>(solver: &mut R, p: &RoverParams, chassis_pos: Vec3) -> RoverModel {
    let chassis = solver.add_body(BodyDesc {
        pose: iso(chassis_pos, quat_identity()),
        vel: Velocity::default(),
        mass: MassProps::from_box(p.chassis_mass, p.chassis_dims),
        fixed: true,
    });

    let wheel_mass = MassProps::from_cylinder_y(p.wheel_mass, p.wheel_radius, p.wheel_width);
    info!(
        ix = wheel_mass.inertia.x, iy = wheel_mass.inertia.y, iz = wheel_mass.inertia.z,
        "wheel inertia"
    );
    let drive = AngleFunction::Ramp { y0: 0.0, slope: p.drive_rate };

    let mut wheels = Vec::with_capacity(WHEEL_STATIONS.len());
    let mut joints = Vec::with_capacity(WHEEL_STATIONS.len());
    let mut meshes = Vec::with_capacity(WHEEL_STATIONS.len());
    for station in WHEEL_STATIONS {
        let offset = p.wheel_offset(station);
        let wheel = solver.add_body(BodyDesc {
            pose: iso(chassis_pos + offset, quat_identity()),
            vel: Velocity::default(),
            mass: wheel_mass,
            fixed: false,
        });
        let joint = solver.add_revolute(RevoluteJoint {
            parent: chassis,
            child: wheel,
            frame: iso(offset, quat_identity()),
        });
        let _ = solver.add_angle_motor(joint, drive);

        wheels.push(wheel);
        joints.push(joint);
        meshes.push(MeshProxy::new(p.wheel_mesh.clone(), p.wheel_scale, Vec3::ZERO, p.wheel_mass));
    }

    info!(
        chassis_mass = p.chassis_mass,
        wheel_mass = p.wheel_mass,
        weight = p.total_weight(solver.gravity().length()),
        "rover built"
    );

    RoverModel {
        chassis,
        wheels,
        joints,
        meshes,
        chassis_mesh: MeshProxy::new(p.chassis_mesh.clone(), p.chassis_scale, Vec3::ZERO, p.chassis_mass),
        chassis_to_bottom: p.chassis_to_bottom(),
    }
}
