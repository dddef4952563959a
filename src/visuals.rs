//! Material and compositing settings for the background layer.
//!
//! Points glow: they are drawn with additive blending so dense clusters
//! bloom. Lines stay faint. A gradient overlay fades the bottom of the surface
//! into the page background color.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How fragment colors combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,

    /// Additive blending.
    ///
    /// Overlapping colors sum instead of overwriting, so dense regions glow.
    Additive,
}

/// Appearance of the point sprites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointMaterial {
    /// Base sprite size in world units, multiplied by each point's own size.
    pub size: f32,
    pub opacity: f32,
    /// Shrink sprites with distance from the camera.
    pub size_attenuation: bool,
    pub blend: BlendMode,
}

impl Default for PointMaterial {
    fn default() -> Self {
        Self {
            size: 0.05,
            opacity: 0.8,
            size_attenuation: true,
            blend: BlendMode::Additive,
        }
    }
}

/// Appearance of the connector segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineMaterial {
    /// RGB, 0.0-1.0.
    pub color: [f32; 3],
    pub opacity: f32,
}

impl Default for LineMaterial {
    fn default() -> Self {
        Self {
            color: [0.0, 1.0, 1.0],
            opacity: 0.15,
        }
    }
}

/// Vertical fade from transparent into the page background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientOverlay {
    pub enabled: bool,
    /// Page background color (RGB, 0.0-1.0).
    pub color: [f32; 3],
    /// Fraction of the surface height (from the top) where the fade begins.
    pub fade_start: f32,
}

impl Default for GradientOverlay {
    fn default() -> Self {
        Self {
            enabled: true,
            color: [0.02, 0.02, 0.05],
            fade_start: 0.5,
        }
    }
}

impl GradientOverlay {
    /// Overlay opacity at vertical position `v` (0 at the top edge, 1 at the bottom).
    pub fn alpha_at(&self, v: f32) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let span = (1.0 - self.fade_start).max(f32::EPSILON);
        ((v - self.fade_start) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self) -> Vec3 {
        Vec3::from(self.color)
    }
}

/// How the background window sits on the desktop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub title: String,
    /// Initial inner size before the window is maximized.
    pub width: u32,
    pub height: u32,
    /// Fill the screen.
    pub maximized: bool,
    /// Keep the window below every other window.
    pub always_on_bottom: bool,
    /// Let clicks and touches pass through to whatever is underneath.
    ///
    /// Most platforms stop delivering cursor events to a window that does not
    /// take part in hit-testing, which leaves pointer interaction inert.
    pub click_through: bool,
    /// Request a transparent surface and clear to transparent.
    pub transparent: bool,
    /// Request 4x multisampling.
    pub antialias: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            title: "Particle Field".to_string(),
            width: 1280,
            height: 720,
            maximized: true,
            always_on_bottom: true,
            click_through: true,
            transparent: true,
            antialias: true,
        }
    }
}

impl LayerConfig {
    /// MSAA sample count implied by the `antialias` flag.
    pub fn sample_count(&self) -> u32 {
        if self.antialias {
            4
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_transparent_top_half() {
        let overlay = GradientOverlay::default();
        assert_eq!(overlay.alpha_at(0.0), 0.0);
        assert_eq!(overlay.alpha_at(0.5), 0.0);
    }

    #[test]
    fn test_overlay_ramps_to_opaque() {
        let overlay = GradientOverlay::default();
        assert!((overlay.alpha_at(0.75) - 0.5).abs() < 1e-6);
        assert_eq!(overlay.alpha_at(1.0), 1.0);
        assert_eq!(overlay.alpha_at(2.0), 1.0);
    }

    #[test]
    fn test_overlay_disabled() {
        let overlay = GradientOverlay {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(overlay.alpha_at(1.0), 0.0);
    }

    #[test]
    fn test_default_materials() {
        let points = PointMaterial::default();
        assert_eq!(points.blend, BlendMode::Additive);
        assert_eq!(points.opacity, 0.8);
        assert!(points.size_attenuation);

        let lines = LineMaterial::default();
        assert_eq!(lines.opacity, 0.15);
        assert_eq!(lines.color, [0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_sample_count() {
        let mut layer = LayerConfig::default();
        assert_eq!(layer.sample_count(), 4);
        layer.antialias = false;
        assert_eq!(layer.sample_count(), 1);
    }
}
