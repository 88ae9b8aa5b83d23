use core::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);
impl fmt::Display for BodyId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "BodyId({})", self.0) } }

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct JointId(pub u32);
impl fmt::Display for JointId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "JointId({})", self.0) } }

/// Index of a boundary mesh inside the terrain solver. Wheel `i` always talks to `MeshId(i)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);
impl fmt::Display for MeshId { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "MeshId({})", self.0) } }

impl MeshId {
    #[inline] pub fn index(self) -> usize { self.0 as usize }
}
