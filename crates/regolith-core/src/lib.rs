pub mod scalar;
pub mod ids;
pub mod types;
pub mod hash;
pub mod rng;
pub mod time;
pub mod mode;

pub use scalar::Scalar;
pub use ids::{BodyId, JointId, MeshId};
pub use types::{Vec3, Mat3, Isometry, Velocity, Wrench, vec3, iso, quat_identity};
pub use hash::{StepHasher, hex32};
pub use rng::XorShift64;
pub use time::StepClock;
pub use mode::RunMode;
pub use glam::Quat;
