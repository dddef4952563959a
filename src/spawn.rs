//! Spawn context for point and segment initialization.
//!
//! Wraps the random source used to lay out the field so generation is a pure
//! function of `(count, rng)`. Tests and embedders pass a seeded context;
//! only [`run`](crate::run) falls back to entropy when no seed is configured.

use crate::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source with helpers for the layouts the field needs.
///
/// ```ignore
/// let mut ctx = SpawnContext::seeded(7);
/// let cloud = PointCloud::generate(1500, &mut ctx);
/// let lines = Connectors::generate(100, &mut ctx);
/// ```
pub struct SpawnContext<R = StdRng> {
    rng: R,
}

impl SpawnContext<StdRng> {
    /// Deterministic context: the same seed always yields the same field.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Non-deterministic context seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Seeded when `seed` is set, from entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> SpawnContext<R> {
    /// Wrap an arbitrary random number generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// `min + random() * (max - min)`, so the result lies in `[min, max]`.
    #[inline]
    pub fn random_between(&mut self, min: f32, max: f32) -> f32 {
        min + self.random() * (max - min)
    }

    /// Random value in `[-extent / 2, extent / 2)`.
    #[inline]
    pub fn random_centered(&mut self, extent: f32) -> f32 {
        (self.random() - 0.5) * extent
    }

    // ========== Position helpers ==========

    /// Random point inside an axis-aligned box of the given full size,
    /// centered at the origin.
    pub fn random_in_box(&mut self, size: Vec3) -> Vec3 {
        Vec3::new(
            self.random_centered(size.x),
            self.random_centered(size.y),
            self.random_centered(size.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_in_box_bounds() {
        let mut ctx = SpawnContext::seeded(1);
        let size = Vec3::new(30.0, 30.0, 15.0);
        for _ in 0..1000 {
            let p = ctx.random_in_box(size);
            assert!(p.x >= -15.0 && p.x < 15.0);
            assert!(p.y >= -15.0 && p.y < 15.0);
            assert!(p.z >= -7.5 && p.z < 7.5);
        }
    }

    #[test]
    fn test_random_between_bounds() {
        let mut ctx = SpawnContext::seeded(2);
        for _ in 0..1000 {
            let v = ctx.random_between(0.5, 2.5);
            assert!((0.5..=2.5).contains(&v));
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SpawnContext::seeded(42);
        let mut b = SpawnContext::seeded(42);
        for _ in 0..16 {
            assert_eq!(a.random(), b.random());
        }
    }
}
