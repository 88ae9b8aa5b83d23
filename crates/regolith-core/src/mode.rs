use core::fmt;

/// Run mode, picked once on the command line and immutable for the whole run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RunMode {
    /// Let the terrain settle under gravity and write a checkpoint at the end.
    Settling,
    /// Load a settled checkpoint and drive the rover over it.
    Testing,
}

impl RunMode {
    /// `0` → Settling, `1` → Testing.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Settling),
            1 => Some(Self::Testing),
            _ => None,
        }
    }
    /// Wheel/terrain contact is only resolved while testing.
    #[inline] pub fn mesh_collision(self) -> bool { matches!(self, Self::Testing) }
    /// Simulated end time for the run.
    #[inline] pub fn end_time(self) -> f64 {
        match self {
            Self::Settling => 1.0,
            Self::Testing => 10.0,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settling => f.write_str("settling"),
            Self::Testing => f.write_str("testing"),
        }
    }
}
