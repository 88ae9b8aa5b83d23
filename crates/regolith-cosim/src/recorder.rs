use std::path::PathBuf;

use anyhow::Context;
use regolith_io::{snapshot_base, write_mesh_frame_file, MeshFrameRow, WriteMode};
use regolith_terrain::TerrainSolver;
use regolith_world::RigidSolver;
use tracing::info;

use crate::context::SimContext;

/// Writes a terrain snapshot and a mesh-frame file every `out_steps` steps.
#[derive(Clone, Debug)]
pub struct FrameRecorder {
    pub out_dir: PathBuf,
    pub out_steps: u64,
    pub write_mode: WriteMode,
}

impl FrameRecorder {
    pub fn new(out_dir: impl Into<PathBuf>, out_steps: u64, write_mode: WriteMode) -> Self {
        Self { out_dir: out_dir.into(), out_steps: out_steps.max(1), write_mode }
    }

    #[inline] pub fn is_due(&self, step: u64) -> bool { step % self.out_steps == 0 }

    /// Write frame `ctx.frames` and bump the counter. Rows are the wheels in model order,
    /// then the chassis.
    pub fn record<R: RigidSolver, T: TerrainSolver>(
        &self,
        rigid: &R,
        terrain: &T,
        ctx: &mut SimContext,
    ) -> anyhow::Result<PathBuf> {
        let frame = ctx.frames;
        info!(frame, step = ctx.clock.step(), "rendering frame");

        if self.write_mode == WriteMode::Csv {
            let base = snapshot_base(&self.out_dir, frame);
            terrain
                .write_snapshot(&base)
                .with_context(|| format!("terrain snapshot {}", base.display()))?;
        }

        let model = &ctx.model;
        let mut rows: Vec<MeshFrameRow<'_>> = model
            .wheels()
            .iter()
            .zip(model.meshes())
            .map(|(&w, mesh)| MeshFrameRow { name: &mesh.filename, pose: rigid.pose(w), scale: mesh.scale })
            .collect();
        let cm = model.chassis_mesh();
        rows.push(MeshFrameRow { name: &cm.filename, pose: rigid.pose(model.chassis()), scale: cm.scale });

        let path = write_mesh_frame_file(&self.out_dir, frame, &rows, ctx.height.get())?;
        ctx.frames += 1;
        Ok(path)
    }
}
