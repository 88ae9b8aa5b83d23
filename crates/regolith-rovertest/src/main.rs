use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use regolith_core::{vec3, RunMode, Scalar, Vec3};
use regolith_cosim::{CoSim, CoSimConfig};
use regolith_io::{load_params, SimParams};
use regolith_rover::{build_rover, RoverParams};
use regolith_terrain::{BedParams, SoftSphereBed, TerrainInit};
use regolith_world::WorldBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Mars surface gravity, cm/s².
const MARS_GRAVITY: Scalar = 370.0;
const DEFAULT_DATA_DIR: &str = "../data/";

#[derive(Parser, Debug)]
#[command(name = "regolith-rovertest", version, about = "Rover on granular terrain, loosely coupled")]
struct Opts {
    /// JSON run parameters (looked up in the data directory unless the path exists)
    config: PathBuf,
    /// 0 = settling, 1 = testing
    #[arg(allow_negative_numbers = true)]
    run_mode: i64,
    /// Settling writes `<base>.csv`; testing reads it
    checkpoint_file_base: PathBuf,
    /// Tilt of gravity about +Y, degrees
    #[arg(allow_negative_numbers = true)]
    gravity_angle_deg: Scalar,
}

fn usage() -> String {
    "usage: regolith-rovertest <json_file> <run_mode: 0-settling, 1-running> <checkpoint_file_base> <gravity angle (deg)>"
        .to_string()
}

fn data_dir() -> String {
    std::env::var("REGOLITH_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
}

/// Use `path` as given if it exists, else look it up in `data_dir`.
fn resolve_config(path: &Path, data_dir: &str) -> PathBuf {
    if path.exists() { path.to_path_buf() } else { Path::new(data_dir).join(path) }
}

/// Gravity tilted by `deg` about +Y: `(-g sin θ, 0, -g cos θ)`.
fn gravity_from_angle(deg: Scalar) -> Vec3 {
    let th = deg.to_radians();
    vec3(-MARS_GRAVITY * th.sin(), 0.0, -MARS_GRAVITY * th.cos())
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

fn run(mode: RunMode, params: SimParams, opts: &Opts, data_dir: &str) -> anyhow::Result<()> {
    let gravity = gravity_from_angle(opts.gravity_angle_deg);
    info!(%mode, gravity = ?gravity, config = %opts.config.display(), "starting");

    let rover = RoverParams::default().with_data_dir(data_dir);
    let mut rigid = WorldBuilder::new().with_gravity(gravity).build();
    let model = build_rover(&mut rigid, &rover, vec3(-params.box_x / 4.0, 0.0, 0.0));

    let particles = TerrainInit::for_mode(mode, &params, &opts.checkpoint_file_base)
        .positions()
        .context("initial terrain")?;
    let bed = SoftSphereBed::new(BedParams::from_sim(&params, gravity));

    let cfg = CoSimConfig::from_params(&params, mode, opts.checkpoint_file_base.clone())?;
    let mut sim = CoSim::new(rigid, bed, model, particles, cfg);
    let summary = sim.run()?;
    info!("Time: {:.3} seconds", summary.wall_seconds);
    println!("{summary}");
    Ok(())
}

fn main() -> ExitCode {
    let opts = match Opts::try_parse() {
        Ok(o) => o,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", usage());
            return ExitCode::from(1);
        }
    };

    let Some(mode) = RunMode::from_code(opts.run_mode) else {
        eprintln!("unknown run mode {}", opts.run_mode);
        eprintln!("{}", usage());
        return ExitCode::from(1);
    };

    let data_dir = data_dir();
    let params = match load_params(&resolve_config(&opts.config, &data_dir)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", usage());
            return ExitCode::from(1);
        }
    };

    init_logging(params.verbose);
    match run(mode, params, &opts, &data_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn level_gravity_points_down() {
        let g = gravity_from_angle(0.0);
        assert_relative_eq!(g.x, 0.0);
        assert_relative_eq!(g.z, -370.0);
    }

    #[test]
    fn tilted_gravity_pulls_toward_minus_x() {
        let g = gravity_from_angle(30.0);
        assert_relative_eq!(g.x, -185.0, epsilon = 1e-3);
        assert_relative_eq!(g.y, 0.0);
        assert_relative_eq!(g.length(), 370.0, epsilon = 1e-3);
    }

    #[test]
    fn config_falls_back_to_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("here.json");
        std::fs::write(&existing, "{}").unwrap();
        assert_eq!(resolve_config(&existing, "../data/"), existing);
        assert_eq!(resolve_config(Path::new("nope/rover.json"), "../data/"), PathBuf::from("../data/nope/rover.json"));
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_filter(0), "info");
        assert_eq!(default_filter(1), "debug");
        assert_eq!(default_filter(7), "trace");
    }

    #[test]
    fn four_positionals_required() {
        assert!(Opts::try_parse_from(["regolith-rovertest", "a.json", "0", "base"]).is_err());
        assert!(Opts::try_parse_from(["regolith-rovertest", "a.json", "0", "base", "0", "extra"]).is_err());
        let o = Opts::try_parse_from(["regolith-rovertest", "a.json", "1", "base", "-15"]).unwrap();
        assert_eq!(o.run_mode, 1);
        assert_eq!(o.gravity_angle_deg, -15.0);
    }
}
