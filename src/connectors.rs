//! Short decorative line segments.
//!
//! Segments are scattered independently of the point cloud: each one is a
//! random base point plus a small random offset. Only the group rotation is
//! animated; endpoint data is never touched after generation.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Vec3};
use rand::Rng;

use crate::spawn::SpawnContext;

/// Full size of the box segment start points are scattered in.
pub const BASE_BOX: Vec3 = Vec3::new(25.0, 25.0, 10.0);
/// Full size of the box the end point is offset within, relative to the start.
pub const OFFSET_BOX: Vec3 = Vec3::new(3.0, 3.0, 2.0);

/// One line segment. Laid out as two consecutive line-list vertices.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

/// A fixed set of segments sharing one rotating transform.
#[derive(Debug, Clone)]
pub struct Connectors {
    segments: Vec<Segment>,
    /// Euler rotation (X, Y, Z) of the whole group.
    rotation: Vec3,
}

impl Connectors {
    /// Scatter `count` segments using the given random source.
    pub fn generate<R: Rng>(count: usize, ctx: &mut SpawnContext<R>) -> Self {
        let segments = (0..count)
            .map(|_| {
                let start = ctx.random_in_box(BASE_BOX);
                let end = start + ctx.random_in_box(OFFSET_BOX);
                Segment { start, end }
            })
            .collect();

        Self {
            segments,
            rotation: Vec3::ZERO,
        }
    }

    /// Set the group rotation for elapsed time `t` (seconds).
    pub fn update(&mut self, t: f32) {
        self.rotation.y = t * 0.01;
        self.rotation.x = (t * 0.1).sin() * 0.1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Group transform, rotating about X, then Y, then Z.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_are_short() {
        let mut ctx = SpawnContext::seeded(21);
        let connectors = Connectors::generate(150, &mut ctx);
        assert_eq!(connectors.len(), 150);

        for seg in connectors.segments() {
            assert!(seg.start.x.abs() <= 12.5 && seg.start.y.abs() <= 12.5);
            assert!(seg.start.z.abs() <= 5.0);
            let offset = (seg.end - seg.start).abs();
            assert!(offset.x <= 1.5 + 1e-5 && offset.y <= 1.5 + 1e-5);
            assert!(offset.z <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_endpoints_immutable() {
        let mut ctx = SpawnContext::seeded(22);
        let mut connectors = Connectors::generate(100, &mut ctx);
        let before = connectors.segments().to_vec();

        for frame in 0..300 {
            connectors.update(frame as f32 / 60.0);
        }

        assert_eq!(connectors.segments(), before.as_slice());
        assert_ne!(connectors.rotation(), Vec3::ZERO);
    }

    #[test]
    fn test_rotation_independent_of_history() {
        let mut ctx = SpawnContext::seeded(23);
        let mut stepped = Connectors::generate(4, &mut ctx);
        for frame in 0..=600 {
            stepped.update(frame as f32 / 60.0);
        }

        let mut ctx = SpawnContext::seeded(23);
        let mut direct = Connectors::generate(4, &mut ctx);
        direct.update(10.0);

        assert_eq!(stepped.rotation(), direct.rotation());
        assert!((direct.rotation().y - 0.1).abs() < 1e-6);
        assert!((direct.rotation().x - 1.0_f32.sin() * 0.1).abs() < 1e-6);
        assert_eq!(direct.rotation().z, 0.0);
    }

    #[test]
    fn test_model_matrix_identity_at_rest() {
        let mut ctx = SpawnContext::seeded(24);
        let connectors = Connectors::generate(1, &mut ctx);
        assert!(connectors.model_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }
}
