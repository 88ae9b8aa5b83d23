use blake3::Hasher;
use glam::Quat;

use crate::types::{Isometry, Vec3};

/// BLAKE3 over little-endian state words. Feeding order is part of the digest.
pub struct StepHasher(Hasher);

impl StepHasher {
    pub fn new() -> Self { StepHasher(Hasher::new()) }
    pub fn update_bytes(&mut self, bytes: &[u8]) { self.0.update(bytes); }
    pub fn u64(&mut self, v: u64) { self.0.update(&v.to_le_bytes()); }
    pub fn f32(&mut self, v: f32) { self.0.update(&v.to_le_bytes()); }
    pub fn vec3(&mut self, v: Vec3) {
        for c in v.to_array() { self.f32(c); }
    }
    pub fn quat(&mut self, q: Quat) {
        for c in q.to_array() { self.f32(c); }
    }
    pub fn pose(&mut self, p: &Isometry) {
        self.vec3(p.pos);
        self.quat(p.rot);
    }
    pub fn finalize(self) -> [u8; 32] { *self.0.finalize().as_bytes() }
}

impl Default for StepHasher {
    fn default() -> Self { Self::new() }
}

/// Lowercase hex of a 32-byte digest.
pub fn hex32(x: &[u8; 32]) -> String {
    use std::fmt::Write;
    x.iter().fold(String::with_capacity(64), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
