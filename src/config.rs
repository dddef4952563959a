//! Top-level configuration.
//!
//! Every field has a default matching the stock background, so a config file
//! only needs to list what it changes:
//!
//! ```json
//! { "point_count": 3000, "seed": 7, "lines": { "opacity": 0.3 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::error::ConfigError;
use crate::points::PointerInfluence;
use crate::visuals::{GradientOverlay, LayerConfig, LineMaterial, PointMaterial};

/// Everything needed to build and present a particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of points in the cloud.
    pub point_count: usize,
    /// Number of connector segments.
    pub segment_count: usize,
    /// Seed for the layout. `None` picks a fresh layout on every run.
    pub seed: Option<u64>,
    pub pointer: PointerInfluence,
    pub camera: CameraConfig,
    /// Ambient light intensity. Both materials are unlit, so this only
    /// reaches the shaders as a uniform.
    pub ambient_intensity: f32,
    pub points: PointMaterial,
    pub lines: LineMaterial,
    pub overlay: GradientOverlay,
    pub layer: LayerConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            point_count: 1500,
            segment_count: 100,
            seed: None,
            pointer: PointerInfluence::default(),
            camera: CameraConfig::default(),
            ambient_intensity: 0.5,
            points: PointMaterial::default(),
            lines: LineMaterial::default(),
            overlay: GradientOverlay::default(),
            layer: LayerConfig::default(),
        }
    }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of points.
    pub fn with_point_count(mut self, count: usize) -> Self {
        self.point_count = count;
        self
    }

    /// Set the number of connector segments.
    pub fn with_segment_count(mut self, count: usize) -> Self {
        self.segment_count = count;
        self
    }

    /// Make the layout reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_pointer_influence(mut self, influence: PointerInfluence) -> Self {
        self.pointer = influence;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_point_material(mut self, material: PointMaterial) -> Self {
        self.points = material;
        self
    }

    pub fn with_line_material(mut self, material: LineMaterial) -> Self {
        self.lines = material;
        self
    }

    pub fn with_overlay(mut self, overlay: GradientOverlay) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_layer(mut self, layer: LayerConfig) -> Self {
        self.layer = layer;
        self
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
