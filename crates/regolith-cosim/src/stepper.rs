use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use regolith_core::{hex32, RunMode, Scalar, StepHasher, Vec3};
use regolith_io::{ConfigError, SimParams, WriteMode};
use regolith_rover::RoverModel;
use regolith_terrain::TerrainSolver;
use regolith_world::RigidSolver;
use tracing::{debug, info};

use crate::context::SimContext;
use crate::phase::{ChassisState, PhaseController};
use crate::recorder::FrameRecorder;

/// Run settings the stepper needs, resolved from the JSON parameters and the command line.
#[derive(Clone, Debug)]
pub struct CoSimConfig {
    pub mode: RunMode,
    pub dt: f64,
    pub end_time: f64,
    pub out_steps: u64,
    pub out_dir: PathBuf,
    pub write_mode: WriteMode,
    /// Settling writes its final terrain to `<checkpoint_base>.csv`.
    pub checkpoint_base: PathBuf,
    pub box_z: Scalar,
}

impl CoSimConfig {
    pub fn from_params(p: &SimParams, mode: RunMode, checkpoint_base: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            mode,
            dt: p.step_size,
            end_time: mode.end_time(),
            out_steps: p.out_steps()?,
            out_dir: p.output_dir.clone(),
            write_mode: p.write_mode,
            checkpoint_base: checkpoint_base.into(),
            box_z: p.box_z,
        })
    }
}

/// What a finished run reports.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub steps: u64,
    pub frames: u64,
    pub release_step: Option<u64>,
    /// BLAKE3 over the final rover poses and the terrain height.
    pub digest: [u8; 32],
    pub wall_seconds: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "steps={} frames={} ", self.steps, self.frames)?;
        match self.release_step {
            Some(s) => write!(f, "release_step={s} ")?,
            None => write!(f, "release_step=- ")?,
        }
        write!(f, "digest={} time={:.3}s", hex32(&self.digest), self.wall_seconds)
    }
}

pub struct CoSim<R: RigidSolver, T: TerrainSolver> {
    pub rigid: R,
    pub terrain: T,
    pub ctx: SimContext,
    pub phase: PhaseController,
    pub recorder: FrameRecorder,
    pub cfg: CoSimConfig,
}

impl<R: RigidSolver, T: TerrainSolver> CoSim<R, T> {
    /// Hand the initial particles and the wheel meshes to the terrain and finish its setup.
    /// `model` must already live in `rigid`.
    pub fn new(rigid: R, mut terrain: T, model: RoverModel, particles: Vec<Vec3>, cfg: CoSimConfig) -> Self {
        terrain.set_particle_positions(particles);
        terrain.load_meshes(model.meshes());
        terrain.enable_mesh_collision(cfg.mode.mesh_collision());
        terrain.initialize();
        info!(
            mode = %cfg.mode,
            particles = terrain.num_particles(),
            meshes = terrain.num_meshes(),
            end_time = cfg.end_time,
            out_steps = cfg.out_steps,
            "co-simulation ready"
        );

        let ctx = SimContext::new(model, cfg.dt, cfg.box_z);
        let recorder = FrameRecorder::new(cfg.out_dir.clone(), cfg.out_steps, cfg.write_mode);
        Self { rigid, terrain, ctx, phase: PhaseController::default(), recorder, cfg }
    }

    #[inline] pub fn time(&self) -> f64 { self.ctx.clock.time() }
    #[inline] pub fn step_index(&self) -> u64 { self.ctx.clock.step() }
    #[inline] pub fn is_done(&self) -> bool { !self.ctx.clock.before(self.cfg.end_time) }

    /// One coupled iteration.
    pub fn step(&mut self) -> anyhow::Result<()> {
        let dt = self.cfg.dt;
        self.phase.observe(&mut self.rigid, &self.terrain, &mut self.ctx);

        for (wheel, mesh) in self.ctx.model.wheel_meshes() {
            self.terrain.apply_mesh_motion(mesh, self.rigid.pose(wheel), self.rigid.vel(wheel));
        }

        self.terrain.advance(dt);
        self.rigid.do_step(dt);

        for (wheel, mesh) in self.ctx.model.wheel_meshes() {
            let w = self.terrain.collect_mesh_contact(mesh);
            let at = self.rigid.pose(wheel).pos;
            self.rigid.empty_accumulators(wheel);
            self.rigid.accumulate_force(wheel, w.force, at);
            self.rigid.accumulate_torque(wheel, w.torque);
        }

        let step = self.ctx.clock.step();
        if self.recorder.is_due(step) {
            if let Some(&last) = self.ctx.model.wheels().last() {
                let w = self.rigid.accumulated(last);
                debug!(force = ?w.force, torque = ?w.torque, "last wheel contact");
            }
            self.recorder.record(&self.rigid, &self.terrain, &mut self.ctx)?;
        }

        self.ctx.clock.advance();
        Ok(())
    }

    /// Step until the mode's end time. Settling also writes the checkpoint.
    pub fn run(&mut self) -> anyhow::Result<RunSummary> {
        std::fs::create_dir_all(&self.cfg.out_dir)
            .with_context(|| format!("create output dir {}", self.cfg.out_dir.display()))?;
        let start = Instant::now();
        while !self.is_done() {
            self.step()?;
        }

        if self.cfg.mode == RunMode::Settling {
            let base = &self.cfg.checkpoint_base;
            self.terrain
                .write_snapshot(base)
                .with_context(|| format!("write checkpoint {}", base.display()))?;
            info!(path = %base.display(), particles = self.terrain.num_particles(), "checkpoint written");
        }

        let summary = RunSummary {
            steps: self.step_index(),
            frames: self.ctx.frames,
            release_step: match self.phase.state() {
                ChassisState::Free { step, .. } => Some(step),
                ChassisState::Fixed => None,
            },
            digest: self.state_digest(),
            wall_seconds: start.elapsed().as_secs_f64(),
        };
        info!(%summary, "run finished");
        Ok(summary)
    }

    /// Hash of the step counter, every rover body pose and the terrain height.
    pub fn state_digest(&self) -> [u8; 32] {
        let mut h = StepHasher::new();
        h.u64(self.step_index());
        let model = &self.ctx.model;
        for b in std::iter::once(model.chassis()).chain(model.wheels().iter().copied()) {
            h.pose(&self.rigid.pose(b));
        }
        h.f32(self.terrain.max_particle_height());
        h.finalize()
    }
}
