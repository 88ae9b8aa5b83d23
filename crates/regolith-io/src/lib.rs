//! File formats used by the rover co-simulation.
//!
//! - [`config`]: JSON run parameters (`SimParams`).
//! - [`checkpoint`]: particle position CSV, read at the start of a testing run and written
//!   as terrain snapshots.
//! - [`frames`]: per-frame rigid body pose CSV for visualization.

pub mod error;
pub mod config;
pub mod checkpoint;
pub mod frames;

pub use error::{CheckpointError, ConfigError, LineError};
pub use config::{SimParams, WriteMode, load_params, out_steps};
pub use checkpoint::{Checkpoint, csv_path, load_checkpoint, read_checkpoint, parse_point, write_particles_csv};
pub use frames::{MeshFrameRow, MESH_FRAME_HEADER, format_row, write_mesh_frames, write_mesh_frame_file, mesh_frame_path, snapshot_base};
