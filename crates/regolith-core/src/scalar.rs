/// Solver-side floating point type. Simulated time is kept in `f64` (see `StepClock`).
pub type Scalar = f32;
