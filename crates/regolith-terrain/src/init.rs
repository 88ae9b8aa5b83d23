use std::path::{Path, PathBuf};

use regolith_core::{vec3, RunMode, Scalar, Vec3};
use regolith_io::{csv_path, load_checkpoint, CheckpointError, SimParams};
use tracing::{info, warn};

use crate::sampler::{LayerSampler, SAMPLER_PADDING};

const SAMPLER_SEED: u64 = 0x5EED_2E60_1170;

/// Box the settling fill occupies: `(center, half_dims)`.
///
/// The fill spans the upper half of the bed box (`0..box_Z/2`), shrunk by 2 on every side.
pub fn settling_region(params: &SimParams) -> (Vec3, Vec3) {
    let bottom: Scalar = 0.0;
    let top = params.box_z / 2.0;
    let center = vec3(0.0, 0.0, (bottom + top) / 2.0);
    let hdims = vec3(
        params.box_x / 2.0 - 2.0,
        params.box_y / 2.0 - 2.0,
        (bottom - top).abs() / 2.0 - 2.0,
    );
    (center, hdims)
}

/// Where the initial particle positions come from.
#[derive(Clone, Debug)]
pub enum TerrainInit {
    Sample { center: Vec3, hdims: Vec3, separation: Scalar, seed: u64 },
    Checkpoint { path: PathBuf },
}

impl TerrainInit {
    /// Settling fills the box; Testing reloads `<checkpoint_base>.csv`.
    pub fn for_mode(mode: RunMode, params: &SimParams, checkpoint_base: &Path) -> Self {
        match mode {
            RunMode::Settling => {
                let (center, hdims) = settling_region(params);
                TerrainInit::Sample {
                    center,
                    hdims,
                    separation: 2.0 * params.sphere_radius * SAMPLER_PADDING,
                    seed: SAMPLER_SEED,
                }
            }
            RunMode::Testing => TerrainInit::Checkpoint { path: csv_path(checkpoint_base) },
        }
    }

    /// Produce the positions. A checkpoint that cannot be opened is fatal; malformed lines
    /// are skipped with a warning.
    pub fn positions(&self) -> Result<Vec<Vec3>, CheckpointError> {
        match self {
            TerrainInit::Sample { center, hdims, separation, seed } => {
                let pts = LayerSampler::new(*separation, *seed).sample_box(*center, *hdims);
                info!(particles = pts.len(), "sampled settling bed");
                Ok(pts)
            }
            TerrainInit::Checkpoint { path } => {
                let cp = load_checkpoint(path)?;
                if !cp.rejected.is_empty() {
                    for e in &cp.rejected {
                        warn!("{}: {e}", path.display());
                    }
                    warn!(rejected = cp.rejected.len(), "skipped malformed checkpoint lines");
                }
                info!(particles = cp.len(), path = %path.display(), "loaded checkpoint");
                Ok(cp.points)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn params() -> SimParams {
        serde_json::from_str::<SimParams>(
            r#"{"sphere_radius":1.0,"sphere_density":2.5,"box_X":40,"box_Y":20,"box_Z":24,
                "step_size":1e-4,"normalStiffS2S":1e6,"normalStiffS2W":1e6,"normalStiffS2M":1e6,
                "normalDampS2S":1e3,"normalDampS2W":1e3,"normalDampS2M":1e3,"output_dir":"out"}"#,
        )
        .unwrap()
    }

    #[test]
    fn region_matches_layout() {
        let (c, h) = settling_region(&params());
        assert_eq!(c, vec3(0.0, 0.0, 6.0));
        assert_eq!(h, vec3(18.0, 8.0, 4.0));
    }

    #[test]
    fn settling_samples_inside_region() {
        let p = params();
        let init = TerrainInit::for_mode(RunMode::Settling, &p, Path::new("unused"));
        let pts = init.positions().unwrap();
        assert!(!pts.is_empty());
        assert!(pts.iter().all(|q| q.x.abs() <= 18.0 && q.y.abs() <= 8.0 && q.z >= 2.0 && q.z <= 10.0));
    }

    #[test]
    fn testing_reads_csv_next_to_base() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("settled");
        let mut f = std::fs::File::create(dir.path().join("settled.csv")).unwrap();
        writeln!(f, "x,y,z").unwrap();
        writeln!(f, "1.0,2.0,3.0").unwrap();
        writeln!(f, "bad").unwrap();
        writeln!(f, "4.0,5.0,6.0").unwrap();
        drop(f);
        let pts = TerrainInit::for_mode(RunMode::Testing, &params(), &base).positions().unwrap();
        assert_eq!(pts, vec![vec3(1.0, 2.0, 3.0), vec3(4.0, 5.0, 6.0)]);
    }

    #[test]
    fn missing_checkpoint_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let init = TerrainInit::for_mode(RunMode::Testing, &params(), &dir.path().join("none"));
        assert!(matches!(init.positions(), Err(CheckpointError::Open { .. })));
    }
}
