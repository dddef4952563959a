//! The drifting point cloud.
//!
//! Every point has a position, a cyan-biased color and a sprite size. Colors
//! and sizes are fixed when the cloud is generated; positions drift a little
//! every frame and are pulled toward the pointer when it comes close.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::input::PointerState;
use crate::spawn::SpawnContext;

/// Full size of the box points are scattered in.
pub const SPAWN_BOX: Vec3 = Vec3::new(30.0, 30.0, 15.0);
/// Group rotation around Y, in radians per second.
pub const SPIN_RATE: f32 = 0.02;

/// How strongly the pointer pulls on nearby points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerInfluence {
    /// Points whose XY distance to the projected pointer is below this are affected.
    pub radius: f32,
    /// Fraction of the offset to the pointer applied per frame.
    ///
    /// Positive values attract, negative values push points away.
    pub strength: f32,
}

impl Default for PointerInfluence {
    fn default() -> Self {
        Self {
            radius: 3.0,
            strength: 0.02,
        }
    }
}

/// Per-point attributes that never change after generation.
///
/// Uploaded once as the second vertex buffer of the point pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointAttributes {
    pub color: [f32; 3],
    pub size: f32,
}

/// A fixed-size set of animated points.
#[derive(Debug, Clone)]
pub struct PointCloud {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    sizes: Vec<f32>,
    rotation_y: f32,
    influence: PointerInfluence,
    needs_upload: bool,
}

impl PointCloud {
    /// Lay out `count` points using the given random source.
    pub fn generate<R: Rng>(count: usize, ctx: &mut SpawnContext<R>) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        let mut sizes = Vec::with_capacity(count);

        for _ in 0..count {
            positions.push(ctx.random_in_box(SPAWN_BOX));
            colors.push(Vec3::new(
                0.0,
                ctx.random_between(0.8, 1.0),
                ctx.random_between(0.8, 1.0),
            ));
            sizes.push(ctx.random_between(0.5, 2.5));
        }

        Self {
            positions,
            colors,
            sizes,
            rotation_y: 0.0,
            influence: PointerInfluence::default(),
            needs_upload: true,
        }
    }

    /// Replace the default pointer influence.
    pub fn with_influence(mut self, influence: PointerInfluence) -> Self {
        self.influence = influence;
        self
    }

    #[inline]
    pub fn influence(&self) -> PointerInfluence {
        self.influence
    }

    /// Advance the cloud to elapsed time `t` (seconds).
    ///
    /// `viewport` is the visible area at the target plane in scene units; the
    /// pointer's NDC coordinates are scaled by half of it to find the point of
    /// attraction. Drift is added to the current positions, so the result
    /// depends on the whole tick history, while the rotation depends on `t` only.
    pub fn update(&mut self, t: f32, pointer: PointerState, viewport: Vec2) {
        let target = pointer.ndc * viewport * 0.5;
        let PointerInfluence { radius, strength } = self.influence;

        for (i, position) in self.positions.iter_mut().enumerate() {
            let i = i as f32;
            position.y += (t * 0.5 + i * 0.01).sin() * 0.002;
            position.x += (t * 0.3 + i * 0.02).cos() * 0.001;

            let dx = target.x - position.x;
            let dy = target.y - position.y;
            let dist = (dx * dx + dy * dy).sqrt();

            if dist < radius {
                position.x += dx * strength;
                position.y += dy * strength;
            }
        }

        self.needs_upload = true;
        self.rotation_y = t * SPIN_RATE;
    }

    /// Number of points. Fixed for the lifetime of the cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Current positions, in the cloud's local (unrotated) frame.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    #[inline]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Current rotation of the whole cloud around the Y axis, in radians.
    #[inline]
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Model transform applied to every point when drawing.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }

    /// Returns whether positions changed since the last call, clearing the flag.
    pub fn take_needs_upload(&mut self) -> bool {
        std::mem::replace(&mut self.needs_upload, false)
    }

    /// Static per-point data packed for the GPU.
    pub fn attributes(&self) -> Vec<PointAttributes> {
        self.colors
            .iter()
            .zip(&self.sizes)
            .map(|(color, &size)| PointAttributes {
                color: color.to_array(),
                size,
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, index: usize, position: Vec3) {
        self.positions[index] = position;
    }
}
