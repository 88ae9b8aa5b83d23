//! Loose coupling of a rigid rover solver and a granular terrain solver.
//!
//! One iteration: phase check, push wheel motion to the terrain meshes, advance the
//! terrain, advance the rover on the forces pulled last iteration, pull the new mesh
//! forces onto the wheels, record on cadence.

mod context;
mod phase;
mod recorder;
mod stepper;

pub use context::{HeightReference, SimContext};
pub use phase::{ChassisState, PhaseController, RELEASE_TIME};
pub use recorder::FrameRecorder;
pub use stepper::{CoSim, CoSimConfig, RunSummary};
