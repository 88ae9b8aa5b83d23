/// Fixed-step clock. Time is derived from the step counter (`step * dt`) so it never drifts
/// the way a `t += dt` accumulator would.
#[derive(Copy, Clone, Debug)]
pub struct StepClock {
    pub dt: f64,
    step: u64,
}

impl StepClock {
    pub fn new(dt: f64) -> Self { Self { dt, step: 0 } }
    #[inline] pub fn step(&self) -> u64 { self.step }
    #[inline] pub fn time(&self) -> f64 { self.step as f64 * self.dt }
    #[inline] pub fn advance(&mut self) { self.step += 1; }
    /// True while the current step still starts before `end`.
    #[inline] pub fn before(&self, end: f64) -> bool { self.time() < end }
    /// Number of steps a run of length `end` takes.
    pub fn steps_until(dt: f64, end: f64) -> u64 {
        let mut c = Self::new(dt);
        while c.before(end) { c.advance(); }
        c.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test] fn hundred_steps_per_second_at_centi_step() {
        assert_eq!(StepClock::steps_until(0.01, 1.0), 100);
        assert_eq!(StepClock::steps_until(0.05, 1.0), 20);
    }
    #[test] fn time_is_step_times_dt() {
        let mut c = StepClock::new(0.02);
        for _ in 0..25 { c.advance(); }
        assert_eq!(c.step(), 25);
        assert!((c.time() - 0.5).abs() < 1e-12);
    }
}
