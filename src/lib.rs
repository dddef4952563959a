//! # particle-field
//!
//! An animated particle-field background layer: a cloud of drifting cyan
//! points that react to the pointer, plus a sparse set of slowly rotating line
//! segments, composited with additive blending onto a transparent surface that
//! sits behind everything else on the desktop.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_field::prelude::*;
//!
//! fn main() -> Result<(), FieldError> {
//!     particle_field::run(FieldConfig::new().with_point_count(1500).with_seed(7))
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Scene
//!
//! [`SceneHost`] owns everything that changes over time: the [`PointCloud`],
//! the [`Connectors`], the camera, the frame clock and the pointer. It does not
//! touch the GPU, so it can be driven headless:
//!
//! ```ignore
//! let mut ctx = SpawnContext::seeded(42);
//! let mut scene = SceneHost::new(&FieldConfig::default(), &mut ctx, None);
//! scene.set_pointer(PointerState::new(Vec2::new(0.2, -0.1)));
//! scene.tick(1.0);
//! ```
//!
//! ### Per-frame update
//!
//! | Component | Update at elapsed time `t` |
//! |-----------|----------------------------|
//! | Points | small sin/cos drift added to every position, pull toward the pointer inside a 3-unit radius, group rotation `0.02 t` around Y |
//! | Connectors | group rotation `(sin(0.1 t) * 0.1, 0.01 t, 0)`; endpoints never move |
//!
//! ### Pointer
//!
//! [`PointerEvents`] turns window cursor events into normalized device
//! coordinates. Each scene holds exactly one [`input::PointerSubscription`],
//! released when the scene is dropped.

pub mod camera;
pub mod config;
pub mod connectors;
mod error;
mod gpu;
pub mod input;
pub mod points;
pub mod scene;
pub mod spawn;
pub mod time;
pub mod visuals;
mod window;

pub use bytemuck;
pub use camera::{Camera, CameraConfig};
pub use config::FieldConfig;
pub use connectors::{Connectors, Segment};
pub use error::{ConfigError, FieldError, GpuError};
pub use glam::{Vec2, Vec3};
pub use input::{PointerEvents, PointerState};
pub use points::{PointCloud, PointerInfluence};
pub use scene::SceneHost;
pub use spawn::SpawnContext;
pub use time::FrameClock;
pub use visuals::{BlendMode, GradientOverlay, LayerConfig, LineMaterial, PointMaterial};

use winit::event_loop::{ControlFlow, EventLoop};

/// Open the background layer and animate it until the window closes.
///
/// Layout is seeded from `config.seed`, or from entropy when it is `None`.
pub fn run(config: FieldConfig) -> Result<(), FieldError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = window::App::new(config);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_field::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BlendMode, Camera, CameraConfig, Connectors, FieldConfig, FieldError, FrameClock,
        GradientOverlay, LayerConfig, LineMaterial, PointCloud, PointMaterial, PointerEvents,
        PointerInfluence, PointerState, SceneHost, Segment, SpawnContext, Vec2, Vec3,
    };
}
