use regolith_core::{vec3, Scalar, Vec3};

/// Axle station on the chassis. Left is +y.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WheelStation {
    FrontLeft,
    FrontRight,
    MiddleLeft,
    MiddleRight,
    RearLeft,
    RearRight,
}

/// Creation order. This is also the terrain mesh order.
pub const WHEEL_STATIONS: [WheelStation; 6] = [
    WheelStation::FrontLeft,
    WheelStation::FrontRight,
    WheelStation::MiddleLeft,
    WheelStation::MiddleRight,
    WheelStation::RearLeft,
    WheelStation::RearRight,
];

/// Rover geometry and mass, CGS (cm, g).
#[derive(Clone, Debug)]
pub struct RoverParams {
    /// Wheel radius (cm).
    pub wheel_radius: Scalar,
    /// Wheel width along the axle (cm).
    pub wheel_width: Scalar,
    /// Mass of one wheel (g).
    pub wheel_mass: Scalar,
    /// Chassis mass (g).
    pub chassis_mass: Scalar,
    /// Full edge lengths of the box the chassis inertia is computed from.
    pub chassis_dims: Vec3,
    /// `(x, |y|)` of the front, middle and rear axle stations, relative to the chassis.
    pub axle_xy: [(Scalar, Scalar); 3],
    /// Wheel centre height relative to the chassis.
    pub wheel_offset_z: Scalar,
    /// Render scale of the wheel mesh; the terrain side also sizes its contact shape from it.
    pub wheel_scale: Vec3,
    pub chassis_scale: Vec3,
    pub wheel_mesh: String,
    /// Chassis mesh. Only written to frame files, never loaded into the terrain.
    pub chassis_mesh: String,
    /// Wheel spin rate imposed by the drive motors (rad/s).
    pub drive_rate: Scalar,
}

impl Default for RoverParams {
    fn default() -> Self {
        Self {
            wheel_radius: 13.0,
            wheel_width: 16.0,
            wheel_mass: 4000.0,
            chassis_mass: 161_000.0,
            chassis_dims: vec3(200.0, 200.0, 150.0),
            axle_xy: [(70.0, 60.0), (-1.0, 55.0), (-51.0, 60.0)],
            wheel_offset_z: -16.4,
            wheel_scale: vec3(26.0, 16.0, 26.0),
            chassis_scale: vec3(100.0, 100.0, 100.0),
            wheel_mesh: "meshes/wheel_scaled.obj".into(),
            chassis_mesh: "meshes/MER_body.obj".into(),
            drive_rate: std::f32::consts::PI,
        }
    }
}

impl RoverParams {
    /// Prefix both mesh paths with a data directory.
    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.wheel_mesh = format!("{dir}{}", self.wheel_mesh);
        self.chassis_mesh = format!("{dir}{}", self.chassis_mesh);
        self
    }

    /// Chassis origin to the bottom of the wheels.
    #[inline] pub fn chassis_to_bottom(&self) -> Scalar {
        self.wheel_offset_z.abs() + 2.0 * self.wheel_radius
    }

    /// Wheel centre relative to the chassis origin.
    pub fn wheel_offset(&self, station: WheelStation) -> Vec3 {
        use WheelStation::*;
        let (axle, side) = match station {
            FrontLeft => (0, 1.0),
            FrontRight => (0, -1.0),
            MiddleLeft => (1, 1.0),
            MiddleRight => (1, -1.0),
            RearLeft => (2, 1.0),
            RearRight => (2, -1.0),
        };
        let (x, y) = self.axle_xy[axle];
        vec3(x, side * y, self.wheel_offset_z)
    }

    /// Weight of the whole rover under gravity of magnitude `g`.
    pub fn total_weight(&self, g: Scalar) -> Scalar {
        (self.chassis_mass + WHEEL_STATIONS.len() as Scalar * self.wheel_mass) * g.abs()
    }
}
