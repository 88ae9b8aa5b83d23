//! Mesh-frame CSV: one row per tracked rigid body, consumed by offline renderers.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use regolith_core::{Isometry, Vec3};

pub const MESH_FRAME_HEADER: &str = "mesh_name,dx,dy,dz,x1,x2,x3,y1,y2,y3,z1,z2,z3,sx,sy,sz";

#[derive(Debug, Clone)]
pub struct MeshFrameRow<'a> {
    pub name: &'a str,
    pub pose: Isometry,
    pub scale: Vec3,
}

/// Format one row. `height_offset` is added to z only; the rotation columns are renormalized.
pub fn format_row(row: &MeshFrameRow<'_>, height_offset: f32) -> String {
    let p = row.pose.pos;
    let [c0, c1, c2] = row.pose.basis().map(|c| c.normalize_or_zero());
    let s = row.scale;
    let mut out = String::with_capacity(128);
    // writing into a String cannot fail
    let _ = write!(
        out,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        row.name,
        p.x, p.y, p.z + height_offset,
        c0.x, c0.y, c0.z,
        c1.x, c1.y, c1.z,
        c2.x, c2.y, c2.z,
        s.x, s.y, s.z,
    );
    out
}

pub fn write_mesh_frames<W: Write>(mut w: W, rows: &[MeshFrameRow<'_>], height_offset: f32) -> std::io::Result<()> {
    writeln!(w, "{MESH_FRAME_HEADER}")?;
    for r in rows {
        writeln!(w, "{}", format_row(r, height_offset))?;
    }
    w.flush()
}

/// `<out_dir>/step<frame:06>`, the base name handed to the terrain snapshot writer.
pub fn snapshot_base(out_dir: &Path, frame: u64) -> PathBuf {
    out_dir.join(format!("step{frame:06}"))
}

pub fn mesh_frame_path(out_dir: &Path, frame: u64) -> PathBuf {
    out_dir.join(format!("step{frame:06}_meshframes.csv"))
}

/// Create the mesh-frame file for `frame` and write all rows.
pub fn write_mesh_frame_file(out_dir: &Path, frame: u64, rows: &[MeshFrameRow<'_>], height_offset: f32) -> anyhow::Result<PathBuf> {
    let path = mesh_frame_path(out_dir, frame);
    let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    write_mesh_frames(BufWriter::new(f), rows, height_offset)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
