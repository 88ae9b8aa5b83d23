//! Particle position CSV.
//!
//! The first line is a header and is discarded. Every following line starts with
//! `x,y,z`; anything after the third field is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use regolith_core::{vec3, Vec3};
use tracing::debug;

use crate::error::{CheckpointError, LineError};

/// Positions recovered from a checkpoint, in file order, plus the lines that were skipped.
#[derive(Debug, Clone, Default)]
pub struct Checkpoint {
    pub points: Vec<Vec3>,
    pub rejected: Vec<LineError>,
}

impl Checkpoint {
    #[inline] pub fn len(&self) -> usize { self.points.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }
}

/// `<base>.csv`. The extension is appended, never substituted.
pub fn csv_path(base: &Path) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(".csv");
    PathBuf::from(s)
}

/// Parse the first three comma-separated fields of a data line.
pub fn parse_point(line_no: usize, line: &str) -> Result<Vec3, LineError> {
    let mut xyz = [0.0f32; 3];
    let mut found = 0;
    for (col, tok) in line.split(',').take(3).enumerate() {
        let tok = tok.trim();
        xyz[col] = tok.parse::<f32>().map_err(|_| LineError::BadNumber {
            line: line_no,
            column: col + 1,
            token: tok.to_string(),
        })?;
        found += 1;
    }
    if found < 3 {
        return Err(LineError::TooFewFields { line: line_no, found });
    }
    Ok(vec3(xyz[0], xyz[1], xyz[2]))
}

/// Read a checkpoint from any buffered source. Blank lines are ignored.
pub fn read_checkpoint<R: BufRead>(reader: R) -> Result<Checkpoint, CheckpointError> {
    let mut out = Checkpoint::default();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|source| CheckpointError::Read { line: line_no, source })?;
        if line_no == 1 || line.trim().is_empty() {
            continue;
        }
        match parse_point(line_no, &line) {
            Ok(p) => out.points.push(p),
            Err(e) => out.rejected.push(e),
        }
    }
    Ok(out)
}

/// Open `path` and read it as a checkpoint.
pub fn load_checkpoint(path: &Path) -> Result<Checkpoint, CheckpointError> {
    let f = File::open(path)
        .map_err(|source| CheckpointError::Open { path: path.to_path_buf(), source })?;
    let cp = read_checkpoint(BufReader::new(f))?;
    debug!(path = %path.display(), points = cp.len(), rejected = cp.rejected.len(), "checkpoint read");
    Ok(cp)
}

/// Write particles as `x,y,z,absv`. `speeds` must be as long as `positions`.
pub fn write_particles_csv(path: &Path, positions: &[Vec3], speeds: &[f32]) -> anyhow::Result<()> {
    anyhow::ensure!(
        positions.len() == speeds.len(),
        "{} positions but {} speeds",
        positions.len(),
        speeds.len()
    );
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    writeln!(w, "x,y,z,absv")?;
    for (p, v) in positions.iter().zip(speeds) {
        writeln!(w, "{},{},{},{}", p.x, p.y, p.z, v)?;
    }
    w.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn literal_two_points() {
        let cp = read_checkpoint("x,y,z\n1.0,2.0,3.0\n4.0,5.0,6.0\n".as_bytes()).unwrap();
        assert_eq!(cp.points, vec![vec3(1.0, 2.0, 3.0), vec3(4.0, 5.0, 6.0)]);
        assert!(cp.rejected.is_empty());
    }

    #[test]
    fn header_only_is_empty() {
        let cp = read_checkpoint("x,y,z\n".as_bytes()).unwrap();
        assert!(cp.is_empty());
    }

    #[test]
    fn n_lines_in_order_trailing_fields_ignored() {
        let mut s = String::from("x,y,z,absv\n");
        for i in 0..25 {
            s.push_str(&format!("{},{},{},0.5\n", i, -i, i * 2));
        }
        let cp = read_checkpoint(s.as_bytes()).unwrap();
        assert_eq!(cp.len(), 25);
        for (i, p) in cp.points.iter().enumerate() {
            assert_relative_eq!(p.x, i as f32);
            assert_relative_eq!(p.y, -(i as f32));
            assert_relative_eq!(p.z, 2.0 * i as f32);
        }
    }

    #[test]
    fn malformed_lines_are_reported_not_fatal() {
        let s = "h\n1,2,3\n1,2\n\n1,abc,3\n7,8,9\n";
        let cp = read_checkpoint(s.as_bytes()).unwrap();
        assert_eq!(cp.points, vec![vec3(1.0, 2.0, 3.0), vec3(7.0, 8.0, 9.0)]);
        assert_eq!(cp.rejected.len(), 2);
        assert_eq!(cp.rejected[0], LineError::TooFewFields { line: 3, found: 2 });
        assert_eq!(cp.rejected[1].line(), 5);
        assert!(matches!(cp.rejected[1], LineError::BadNumber { column: 2, .. }));
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_checkpoint(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, CheckpointError::Open { .. }));
    }

    #[test]
    fn written_particles_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bed.csv");
        let pts = vec![vec3(0.25, -1.5, 3.0), vec3(1e-3, 2.0, 40.125)];
        write_particles_csv(&path, &pts, &[0.0, 1.0]).unwrap();
        let cp = load_checkpoint(&path).unwrap();
        assert_eq!(cp.points, pts);
    }

    #[test]
    fn csv_path_appends() {
        assert_eq!(csv_path(Path::new("out/settled.v2")), PathBuf::from("out/settled.v2.csv"));
    }

    #[test]
    fn speed_length_mismatch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let r = write_particles_csv(&dir.path().join("x.csv"), &[Vec3::ZERO], &[]);
        assert!(r.is_err());
    }
}
