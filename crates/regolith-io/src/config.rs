use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Terrain snapshot format written at each recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Csv,
    None,
}

/// Run parameters. Key names match the granular JSON files the rover runs were set up with.
/// Lengths are in cm, masses in g, time in s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    pub sphere_radius: f32,
    pub sphere_density: f32,
    #[serde(rename = "box_X")]
    pub box_x: f32,
    #[serde(rename = "box_Y")]
    pub box_y: f32,
    #[serde(rename = "box_Z")]
    pub box_z: f32,
    pub step_size: f64,

    #[serde(rename = "normalStiffS2S")]
    pub normal_stiff_s2s: f32,
    #[serde(rename = "normalStiffS2W")]
    pub normal_stiff_s2w: f32,
    #[serde(rename = "normalStiffS2M")]
    pub normal_stiff_s2m: f32,
    #[serde(rename = "normalDampS2S")]
    pub normal_damp_s2s: f32,
    #[serde(rename = "normalDampS2W")]
    pub normal_damp_s2w: f32,
    #[serde(rename = "normalDampS2M")]
    pub normal_damp_s2m: f32,

    pub output_dir: PathBuf,
    #[serde(default)]
    pub write_mode: WriteMode,
    /// 0 = info, 1 = debug, 2+ = trace.
    #[serde(default)]
    pub verbose: u8,
    #[serde(default = "default_out_fps")]
    pub out_fps: u32,
}

fn default_out_fps() -> u32 { 50 }

impl SimParams {
    pub fn from_json(s: &str, path: &Path) -> Result<Self, ConfigError> {
        let p: SimParams = serde_json::from_str(s)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("sphere_radius", self.sphere_radius as f64),
            ("sphere_density", self.sphere_density as f64),
            ("box_X", self.box_x as f64),
            ("box_Y", self.box_y as f64),
            ("box_Z", self.box_z as f64),
            ("step_size", self.step_size),
        ];
        for (field, v) in positive {
            if !(v > 0.0 && v.is_finite()) {
                return Err(ConfigError::Invalid { field, reason: format!("must be > 0, got {v}") });
            }
        }
        self.out_steps().map(|_| ())
    }

    /// Steps between recorded frames: `floor(1 / (out_fps * step_size))`.
    pub fn out_steps(&self) -> Result<u64, ConfigError> {
        out_steps(self.out_fps, self.step_size)
    }
}

/// Recording cadence for a frame rate and solver step. Zero is rejected.
pub fn out_steps(fps: u32, step: f64) -> Result<u64, ConfigError> {
    let n = (1.0 / (fps as f64 * step)).floor();
    if !(n >= 1.0 && n.is_finite()) {
        return Err(ConfigError::Invalid {
            field: "out_fps",
            reason: format!("{fps} fps at step {step} records less than once per step"),
        });
    }
    Ok(n as u64)
}

/// Read and validate a JSON parameter file.
pub fn load_params(path: &Path) -> Result<SimParams, ConfigError> {
    let s = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    SimParams::from_json(&s, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "sphere_radius": 1.0, "sphere_density": 2.5,
        "box_X": 400, "box_Y": 200, "box_Z": 100,
        "step_size": 0.01, "time_end": 5.0,
        "normalStiffS2S": 1e8, "normalStiffS2W": 1e8, "normalStiffS2M": 1e8,
        "normalDampS2S": 1e4, "normalDampS2W": 1e4, "normalDampS2M": 1e4,
        "output_dir": "rover_out", "write_mode": "none", "verbose": 1
    }"#;

    #[test]
    fn parses_and_defaults() {
        let p = SimParams::from_json(JSON, Path::new("t.json")).unwrap();
        assert_eq!(p.box_x, 400.0);
        assert_eq!(p.write_mode, WriteMode::None);
        assert_eq!(p.out_fps, 50);
        assert_eq!(p.output_dir, PathBuf::from("rover_out"));
        assert_eq!(p.out_steps().unwrap(), 2);
    }

    #[test]
    fn rejects_non_positive_step() {
        let bad = JSON.replace("\"step_size\": 0.01", "\"step_size\": 0.0");
        let err = SimParams::from_json(&bad, Path::new("t.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "step_size", .. }));
    }

    #[test]
    fn rejects_zero_cadence() {
        assert!(out_steps(50, 0.05).is_err());
        assert_eq!(out_steps(50, 0.02).unwrap(), 1);
        assert_eq!(out_steps(50, 0.01).unwrap(), 2);
    }

    #[test]
    fn missing_field_is_parse_error() {
        let err = SimParams::from_json("{}", Path::new("t.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_params(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
