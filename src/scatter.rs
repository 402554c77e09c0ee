//! Uniform random points inside an axis-aligned box.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An axis-aligned box given by two corners.
///
/// The corners do not need to be ordered: each axis spans between its two
/// values, whichever is smaller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn lower(&self) -> Vec3 {
        self.min.min(self.max)
    }

    pub fn upper(&self) -> Vec3 {
        self.min.max(self.max)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.lower()).all() && p.cmple(self.upper()).all()
    }

    /// Samples one point uniformly inside the box.
    ///
    /// Interpolates between the corners rather than scaling by `hi - lo`,
    /// which overflows for finite bounds near `f32::MAX`.
    pub fn sample(&self, rng: &mut impl Rng) -> Vec3 {
        let (lo, hi) = (self.lower(), self.upper());
        let t = Vec3::new(rng.random(), rng.random(), rng.random());
        (lo * (1.0 - t) + hi * t).clamp(lo, hi)
    }
}

/// Samples `count` points uniformly inside `bounds`.
pub fn random_points(count: usize, bounds: Bounds, rng: &mut impl Rng) -> Vec<Vec3> {
    (0..count).map(|_| bounds.sample(rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn points_stay_inside_unordered_bounds() {
        let bounds = Bounds::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(5.0, 0.0, 5.0));
        let mut rng = Pcg64::seed_from_u64(1);
        let points = random_points(500, bounds, &mut rng);
        assert_eq!(points.len(), 500);
        assert!(points.iter().all(|&p| bounds.contains(p)));
    }

    #[test]
    fn degenerate_axis_is_constant() {
        let bounds = Bounds::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 2.0, 1.0));
        let mut rng = Pcg64::seed_from_u64(2);
        assert!(random_points(50, bounds, &mut rng).iter().all(|p| p.y == 2.0));
    }

    #[test]
    fn extreme_finite_bounds_stay_finite() {
        let bounds = Bounds::new(Vec3::splat(-3e38), Vec3::splat(3e38));
        let mut rng = Pcg64::seed_from_u64(4);
        let points = random_points(100, bounds, &mut rng);
        assert!(points.iter().all(|p| p.is_finite() && bounds.contains(*p)));
    }

    #[test]
    fn zero_points() {
        let mut rng = Pcg64::seed_from_u64(3);
        assert!(random_points(0, Bounds::new(Vec3::ZERO, Vec3::ONE), &mut rng).is_empty());
    }
}
