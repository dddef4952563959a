//! WGSL sources and the uniform layouts they expect.

use bytemuck::{Pod, Zeroable};

pub const POINTS_SOURCE: &str = include_str!("points.wgsl");
pub const LINES_SOURCE: &str = include_str!("lines.wgsl");
pub const OVERLAY_SOURCE: &str = include_str!("overlay.wgsl");

/// Uniforms shared by the point and line pipelines.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DrawUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// RGB tint plus opacity.
    pub color: [f32; 4],
    /// Sprite size, size attenuation (0/1), ambient intensity, unused.
    pub params: [f32; 4],
    /// Surface width and height in pixels, aspect ratio, unused.
    pub viewport: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct OverlayUniforms {
    /// Page background RGB plus maximum opacity.
    pub color: [f32; 4],
    /// Fade start, unused x3.
    pub params: [f32; 4],
}
