//! Layered Poisson-disk fill of a box.

use glam::Vec2;
use regolith_core::{vec3, Scalar, Vec3, XorShift64};

/// Separation padding applied to the particle diameter.
pub const SAMPLER_PADDING: Scalar = 1.01;

const ATTEMPTS: u32 = 30;

/// Bridson sampling of the rectangle `center ± half`. Every pair of points is at least
/// `min_dist` apart.
pub fn poisson_disk_2d(rng: &mut XorShift64, center: Vec2, half: Vec2, min_dist: Scalar) -> Vec<Vec2> {
    if !(min_dist > 0.0) || half.x < 0.0 || half.y < 0.0 {
        return Vec::new();
    }
    let lo = center - half;
    let size = half * 2.0;
    let cell = min_dist / std::f32::consts::SQRT_2;
    let gw = (size.x / cell).floor() as usize + 1;
    let gh = (size.y / cell).floor() as usize + 1;
    let mut grid: Vec<Option<u32>> = vec![None; gw * gh];
    let cell_of = |p: Vec2| -> (usize, usize) {
        let c = ((p - lo) / cell).floor();
        ((c.x.max(0.0) as usize).min(gw - 1), (c.y.max(0.0) as usize).min(gh - 1))
    };

    let mut pts: Vec<Vec2> = Vec::new();
    let mut active: Vec<u32> = Vec::new();

    let first = lo + Vec2::new(rng.next_f32() * size.x, rng.next_f32() * size.y);
    let (cx, cy) = cell_of(first);
    grid[cx + cy * gw] = Some(0);
    pts.push(first);
    active.push(0);

    let min2 = min_dist * min_dist;
    while !active.is_empty() {
        let slot = rng.index(active.len());
        let base = pts[active[slot] as usize];
        let mut placed = false;
        for _ in 0..ATTEMPTS {
            let ang = rng.range(0.0, std::f32::consts::TAU);
            let rad = rng.range(min_dist, 2.0 * min_dist);
            let c = base + Vec2::new(ang.cos(), ang.sin()) * rad;
            if c.x < lo.x || c.y < lo.y || c.x > lo.x + size.x || c.y > lo.y + size.y {
                continue;
            }
            let (gx, gy) = cell_of(c);
            let mut clear = true;
            'scan: for ny in gy.saturating_sub(2)..(gy + 3).min(gh) {
                for nx in gx.saturating_sub(2)..(gx + 3).min(gw) {
                    if let Some(j) = grid[nx + ny * gw] {
                        if pts[j as usize].distance_squared(c) < min2 {
                            clear = false;
                            break 'scan;
                        }
                    }
                }
            }
            if clear {
                let id = pts.len() as u32;
                grid[gx + gy * gw] = Some(id);
                pts.push(c);
                active.push(id);
                placed = true;
                break;
            }
        }
        if !placed {
            active.swap_remove(slot);
        }
    }
    pts
}

/// Stacks 2D Poisson-disk layers `separation` apart along z.
#[derive(Clone, Debug)]
pub struct LayerSampler {
    pub separation: Scalar,
    rng: XorShift64,
}

impl LayerSampler {
    pub fn new(separation: Scalar, seed: u64) -> Self {
        Self { separation, rng: XorShift64::new(seed) }
    }

    /// Fill the box `center ± hdims`. Empty if any half dimension is negative.
    pub fn sample_box(&mut self, center: Vec3, hdims: Vec3) -> Vec<Vec3> {
        let mut out = Vec::new();
        if !(self.separation > 0.0) || hdims.cmplt(Vec3::ZERO).any() {
            return out;
        }
        let bottom = center.z - hdims.z;
        let top = center.z + hdims.z;
        let c2 = Vec2::new(center.x, center.y);
        let h2 = Vec2::new(hdims.x, hdims.y);
        let mut layer = 0u32;
        loop {
            let z = bottom + layer as Scalar * self.separation;
            if z > top {
                break;
            }
            for p in poisson_disk_2d(&mut self.rng, c2, h2, self.separation) {
                out.push(vec3(p.x, p.y, z));
            }
            layer += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_respect_min_distance_and_bounds() {
        let mut rng = XorShift64::new(11);
        let pts = poisson_disk_2d(&mut rng, Vec2::ZERO, Vec2::new(10.0, 6.0), 1.5);
        assert!(pts.len() > 20);
        for (i, a) in pts.iter().enumerate() {
            assert!(a.x.abs() <= 10.0 && a.y.abs() <= 6.0);
            for b in &pts[i + 1..] {
                assert!(a.distance(*b) >= 1.5 - 1e-5);
            }
        }
    }

    #[test]
    fn layers_are_separated_and_seeded() {
        let mut s = LayerSampler::new(2.02, 3);
        let a = s.sample_box(vec3(0.0, 0.0, 5.0), vec3(8.0, 8.0, 3.0));
        let mut s2 = LayerSampler::new(2.02, 3);
        let b = s2.sample_box(vec3(0.0, 0.0, 5.0), vec3(8.0, 8.0, 3.0));
        assert_eq!(a, b);
        // z from 2.0 to 8.0 in steps of 2.02: 2.0, 4.02, 6.04
        let mut zs: Vec<f32> = a.iter().map(|p| p.z).collect();
        zs.dedup();
        assert_eq!(zs.len(), 3);
        assert!(a.iter().all(|p| p.z >= 2.0 && p.z <= 8.0));
    }

    #[test]
    fn negative_extent_is_empty() {
        let mut s = LayerSampler::new(2.0, 1);
        assert!(s.sample_box(Vec3::ZERO, vec3(5.0, 5.0, -1.0)).is_empty());
    }
}
