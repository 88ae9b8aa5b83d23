use regolith_core::types::{Mat3, Vec3};

/// Mass and principal (diagonal) inertia about the body's centre of mass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MassProps {
    pub mass: f32,
    pub inv_mass: f32,
    pub inertia: Vec3,
}

impl MassProps {
    pub fn infinite() -> Self {
        Self { mass: f32::INFINITY, inv_mass: 0.0, inertia: Vec3::ONE }
    }

    pub fn new(mass: f32, inertia: Vec3) -> Self {
        let inv_mass = if mass > 0.0 && mass.is_finite() { 1.0 / mass } else { 0.0 };
        Self { mass, inv_mass, inertia }
    }

    /// Solid box of the given full edge lengths.
    pub fn from_box(mass: f32, dims: Vec3) -> Self {
        let x2 = dims.x * dims.x;
        let y2 = dims.y * dims.y;
        let z2 = dims.z * dims.z;
        let ix = (1.0/12.0) * mass * (y2 + z2);
        let iy = (1.0/12.0) * mass * (x2 + z2);
        let iz = (1.0/12.0) * mass * (x2 + y2);
        Self::new(mass, Vec3::new(ix, iy, iz))
    }

    /// Solid cylinder spinning about local Y (the axle). `width` is the full length along Y.
    pub fn from_cylinder_y(mass: f32, radius: f32, width: f32) -> Self {
        let ix = 0.25 * mass * radius*radius + (1.0/12.0) * mass * width*width;
        let iy = 0.5 * mass * radius*radius;
        let iz = ix;
        Self::new(mass, Vec3::new(ix, iy, iz))
    }

    #[inline] pub fn inertia_tensor(&self) -> Mat3 { Mat3::from_diagonal(self.inertia.into()) }

    /// Inverse inertia in body space; zero for infinite mass.
    pub fn inv_inertia_local(&self) -> Mat3 {
        if self.inv_mass == 0.0 { return Mat3::ZERO; }
        let i = self.inertia;
        let inv = |v: f32| if v > 0.0 { 1.0 / v } else { 0.0 };
        Mat3::from_diagonal(glam::Vec3::new(inv(i.x), inv(i.y), inv(i.z)))
    }
}
