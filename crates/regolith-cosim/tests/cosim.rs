use std::cell::RefCell;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use regolith_core::{vec3, BodyId, Isometry, JointId, MeshId, RunMode, Scalar, Vec3, Velocity, Wrench};
use regolith_cosim::{ChassisState, CoSim, CoSimConfig};
use regolith_geom::MassProps;
use regolith_io::{SimParams, WriteMode};
use regolith_rover::{build_rover, RoverParams};
use regolith_terrain::{BedParams, MeshProxy, SoftSphereBed, TerrainInit, TerrainSolver};
use regolith_world::{AngleFunction, BodyDesc, RevoluteJoint, RigidSolver, RoverSystem, WorldBuilder};

const MARS: Vec3 = Vec3::new(0.0, 0.0, -370.0);

fn params(step: f64, out_dir: &Path, stiff: f64) -> SimParams {
    let json = format!(
        r#"{{"sphere_radius":1.0,"sphere_density":2.5,"box_X":20,"box_Y":20,"box_Z":20,
            "step_size":{step},"normalStiffS2S":{stiff},"normalStiffS2W":{stiff},"normalStiffS2M":{stiff},
            "normalDampS2S":20,"normalDampS2W":20,"normalDampS2M":20,
            "output_dir":{dir:?},"write_mode":"none"}}"#,
        dir = out_dir.display().to_string(),
    );
    serde_json::from_str(&json).unwrap()
}

/// Terrain stand-in: remembers what it was told and answers with wrenches that encode the
/// mesh index and the number of advances so far.
#[derive(Default)]
struct ScriptedTerrain {
    particles: Vec<Vec3>,
    meshes: Vec<MeshProxy>,
    collision: bool,
    advances: u64,
    motions: Vec<(MeshId, Isometry, Velocity)>,
    snapshots: RefCell<Vec<PathBuf>>,
    max_height: Scalar,
}

impl TerrainSolver for ScriptedTerrain {
    fn set_particle_positions(&mut self, positions: Vec<Vec3>) { self.particles = positions; }
    fn num_particles(&self) -> usize { self.particles.len() }
    fn load_meshes(&mut self, meshes: &[MeshProxy]) { self.meshes.extend_from_slice(meshes); }
    fn num_meshes(&self) -> usize { self.meshes.len() }
    fn enable_mesh_collision(&mut self, on: bool) { self.collision = on; }
    fn initialize(&mut self) {}
    fn apply_mesh_motion(&mut self, mesh: MeshId, pose: Isometry, vel: Velocity) {
        self.motions.push((mesh, pose, vel));
    }
    fn advance(&mut self, _dt: f64) { self.advances += 1; }
    fn collect_mesh_contact(&self, mesh: MeshId) -> Wrench {
        Wrench::new(vec3(mesh.0 as f32 + 1.0, self.advances as f32, 0.0), vec3(0.0, 0.0, mesh.0 as f32))
    }
    fn max_particle_height(&self) -> Scalar { self.max_height }
    fn write_snapshot(&self, base: &Path) -> anyhow::Result<()> {
        self.snapshots.borrow_mut().push(base.to_path_buf());
        Ok(())
    }
}

/// Rigid solver wrapper that logs the accumulated wrench of every body at each `do_step`.
struct LoggingRigid {
    inner: RoverSystem,
    seen: Vec<Vec<Wrench>>,
}

impl RigidSolver for LoggingRigid {
    fn add_body(&mut self, desc: BodyDesc) -> BodyId { self.inner.add_body(desc) }
    fn add_revolute(&mut self, joint: RevoluteJoint) -> JointId { self.inner.add_revolute(joint) }
    fn add_angle_motor(&mut self, joint: JointId, f: AngleFunction) -> Option<JointId> {
        self.inner.add_angle_motor(joint, f)
    }
    fn mass_props(&self, id: BodyId) -> MassProps { self.inner.mass_props(id) }
    fn set_mass_props(&mut self, id: BodyId, mass: MassProps) { self.inner.set_mass_props(id, mass) }
    fn pose(&self, id: BodyId) -> Isometry { self.inner.pose(id) }
    fn set_pose(&mut self, id: BodyId, pose: Isometry) { self.inner.set_pose(id, pose) }
    fn vel(&self, id: BodyId) -> Velocity { self.inner.vel(id) }
    fn set_vel(&mut self, id: BodyId, vel: Velocity) { self.inner.set_vel(id, vel) }
    fn is_fixed(&self, id: BodyId) -> bool { self.inner.is_fixed(id) }
    fn set_fixed(&mut self, id: BodyId, fixed: bool) { self.inner.set_fixed(id, fixed) }
    fn empty_accumulators(&mut self, id: BodyId) { self.inner.empty_accumulators(id) }
    fn accumulate_force(&mut self, id: BodyId, force: Vec3, point: Vec3) { self.inner.accumulate_force(id, force, point) }
    fn accumulate_torque(&mut self, id: BodyId, torque: Vec3) { self.inner.accumulate_torque(id, torque) }
    fn accumulated(&self, id: BodyId) -> Wrench { self.inner.accumulated(id) }
    fn gravity(&self) -> Vec3 { self.inner.gravity() }
    fn set_gravity(&mut self, g: Vec3) { self.inner.set_gravity(g) }
    fn do_step(&mut self, dt: f64) {
        let n = self.inner.num_bodies();
        self.seen.push((0..n).map(|i| self.inner.accumulated(BodyId(i))).collect());
        self.inner.do_step(dt)
    }
    fn time(&self) -> f64 { self.inner.time() }
}

fn scripted(cfg: CoSimConfig) -> CoSim<LoggingRigid, ScriptedTerrain> {
    let mut rigid = LoggingRigid { inner: WorldBuilder::new().with_gravity(MARS).build(), seen: Vec::new() };
    let model = build_rover(&mut rigid, &RoverParams::default(), vec3(-5.0, 0.0, 0.0));
    CoSim::new(rigid, ScriptedTerrain::default(), model, vec![Vec3::ZERO; 4], cfg)
}

fn config(mode: RunMode, step: f64, out_dir: &Path) -> CoSimConfig {
    let p = params(step, out_dir, 1e5);
    CoSimConfig {
        mode,
        dt: step,
        end_time: mode.end_time(),
        out_steps: 1000,
        out_dir: out_dir.to_path_buf(),
        write_mode: WriteMode::None,
        checkpoint_base: out_dir.join("settled"),
        box_z: p.box_z,
    }
}

#[test]
fn setup_hands_meshes_and_collision_flag_to_terrain() {
    let dir = tempfile::tempdir().unwrap();
    let sim = scripted(config(RunMode::Testing, 0.01, dir.path()));
    assert_eq!(sim.terrain.num_meshes(), 6);
    assert_eq!(sim.terrain.num_particles(), 4);
    assert!(sim.terrain.collision);

    let sim = scripted(config(RunMode::Settling, 0.01, dir.path()));
    assert!(!sim.terrain.collision);
}

#[test]
fn wheel_i_drives_mesh_i() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = scripted(config(RunMode::Testing, 0.01, dir.path()));
    let wheels = sim.ctx.model.wheels().to_vec();
    for k in 0..5 {
        let before: Vec<Isometry> = wheels.iter().map(|&w| sim.rigid.pose(w)).collect();
        sim.step().unwrap();
        let pushed = &sim.terrain.motions[k * 6..(k + 1) * 6];
        for (i, (mesh, pose, _)) in pushed.iter().enumerate() {
            assert_eq!(*mesh, MeshId(i as u32));
            assert_eq!(*pose, before[i]);
        }
        // pulled wrench of mesh i lands on wheel i
        for (i, &w) in wheels.iter().enumerate() {
            assert_eq!(sim.rigid.accumulated(w).force.x, i as f32 + 1.0);
        }
    }
}

#[test]
fn rover_step_consumes_previous_iteration_forces() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = scripted(config(RunMode::Testing, 0.01, dir.path()));
    let wheels = sim.ctx.model.wheels().to_vec();
    for _ in 0..4 {
        sim.step().unwrap();
    }
    let seen = &sim.rigid.seen;
    assert_eq!(seen.len(), 4);
    for &w in &wheels {
        assert_eq!(seen[0][w.0 as usize], Wrench::ZERO);
    }
    for (k, frame) in seen.iter().enumerate().skip(1) {
        for (i, &w) in wheels.iter().enumerate() {
            let f = frame[w.0 as usize].force;
            assert_eq!(f.x, i as f32 + 1.0);
            // the terrain had advanced k times when these forces were pulled
            assert_eq!(f.y, k as f32);
            assert_eq!(frame[w.0 as usize].torque.z, i as f32);
        }
    }
}

#[test]
fn chassis_released_once_at_half_second() {
    for (dt, expected) in [(0.01, 50u64), (0.02, 25), (0.05, 10)] {
        let dir = tempfile::tempdir().unwrap();
        let mut sim = scripted(config(RunMode::Settling, dt, dir.path()));
        let chassis = sim.ctx.model.chassis();
        while !sim.is_done() {
            let s = sim.step_index();
            sim.step().unwrap();
            assert_eq!(sim.rigid.is_fixed(chassis), s < expected, "dt {dt} step {s}");
        }
        match sim.phase.state() {
            ChassisState::Free { step, time } => {
                assert_eq!(step, expected);
                assert_relative_eq!(time, 0.5, epsilon = 1e-9);
            }
            ChassisState::Fixed => panic!("never released at dt {dt}"),
        }
    }
}

#[test]
fn height_reference_moves_to_terrain_on_release() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = scripted(config(RunMode::Settling, 0.01, dir.path()));
    sim.terrain.max_height = 3.0;
    assert_relative_eq!(sim.ctx.height.get(), 20.0 + 42.4, epsilon = 1e-4);
    sim.step().unwrap();

    let frame0 = std::fs::read_to_string(dir.path().join("step000000_meshframes.csv")).unwrap();
    let chassis_row = frame0.lines().last().unwrap();
    assert!(chassis_row.starts_with("meshes/MER_body.obj,"));
    let dz: f32 = chassis_row.split(',').nth(3).unwrap().parse().unwrap();
    assert_relative_eq!(dz, 62.4, epsilon = 1e-4);

    while sim.step_index() <= 50 {
        sim.step().unwrap();
    }
    assert_relative_eq!(sim.ctx.height.get(), 3.0 + 42.4, epsilon = 1e-4);
}

#[test]
fn fifty_frames_over_one_hundred_steps() {
    let dir = tempfile::tempdir().unwrap();
    let p = params(0.01, dir.path(), 1e5);
    let mut cfg = CoSimConfig::from_params(&p, RunMode::Settling, dir.path().join("settled")).unwrap();
    cfg.write_mode = WriteMode::Csv;
    assert_eq!(cfg.out_steps, 2);
    let mut sim = scripted(cfg);
    let summary = sim.run().unwrap();

    assert_eq!(summary.steps, 100);
    assert_eq!(summary.frames, 50);
    assert_eq!(summary.release_step, Some(50));
    for f in 0..50 {
        let text = std::fs::read_to_string(dir.path().join(format!("step{f:06}_meshframes.csv"))).unwrap();
        assert_eq!(text.lines().count(), 1 + 6 + 1);
    }
    assert!(!dir.path().join("step000050_meshframes.csv").exists());

    let snaps = sim.terrain.snapshots.borrow();
    assert_eq!(snaps.len(), 51);
    assert_eq!(snaps[0], dir.path().join("step000000"));
    assert_eq!(snaps[49], dir.path().join("step000049"));
    assert_eq!(snaps[50], dir.path().join("settled"));
}

#[test]
fn testing_run_writes_no_checkpoint_and_no_snapshots_without_csv() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(RunMode::Testing, 0.05, dir.path());
    cfg.end_time = 1.0;
    let mut sim = scripted(cfg);
    sim.run().unwrap();
    assert!(sim.terrain.snapshots.borrow().is_empty());
}

fn bed_sim(mode: RunMode, p: &SimParams, particles: Vec<Vec3>, checkpoint_base: &Path) -> CoSim<RoverSystem, SoftSphereBed> {
    let mut rigid = WorldBuilder::new().with_gravity(MARS).build();
    let model = build_rover(&mut rigid, &RoverParams::default(), vec3(-p.box_x / 4.0, 0.0, 0.0));
    let bed = SoftSphereBed::new(BedParams::from_sim(p, MARS));
    let cfg = CoSimConfig::from_params(p, mode, checkpoint_base).unwrap();
    CoSim::new(rigid, bed, model, particles, cfg)
}

#[test]
fn settled_checkpoint_reloads_for_testing() {
    let dir = tempfile::tempdir().unwrap();
    let p = params(0.001, dir.path(), 1e5);
    let base = dir.path().join("settled");
    let particles = TerrainInit::for_mode(RunMode::Settling, &p, &base).positions().unwrap();
    let n = particles.len();
    assert!(n > 0);

    let mut sim = bed_sim(RunMode::Settling, &p, particles, &base);
    let summary = sim.run().unwrap();
    assert_eq!(summary.steps, 1000);
    assert_eq!(summary.release_step, Some(500));

    let reloaded = TerrainInit::for_mode(RunMode::Testing, &p, &base).positions().unwrap();
    assert_eq!(reloaded.len(), n);
    assert_eq!(reloaded, sim.terrain.positions());
    assert!(reloaded.iter().all(|q| q.is_finite() && q.z >= -11.0 && q.z < 10.0));
}

#[test]
fn identical_runs_have_identical_digests() {
    let dir = tempfile::tempdir().unwrap();
    let p = params(0.001, dir.path(), 1e5);
    let base = dir.path().join("unused");
    let particles = TerrainInit::for_mode(RunMode::Settling, &p, &base).positions().unwrap();

    let run = || {
        let mut sim = bed_sim(RunMode::Testing, &p, particles.clone(), &base);
        sim.cfg.end_time = 0.6;
        sim.run().unwrap()
    };
    let a = run();
    let b = run();
    assert_eq!(a.steps, 600);
    assert_eq!(a.release_step, Some(500));
    assert_eq!(a.digest, b.digest);
    assert!(!base.with_extension("csv").exists());
}
