//! Scene host: owns the camera, the pointer, the clock and both children.
//!
//! The host is renderer-agnostic. The window loop ticks it once per frame
//! and hands it to the GPU renderer; tests drive it with explicit times.

use glam::{Mat4, Vec2};
use rand::Rng;

use crate::camera::Camera;
use crate::config::FieldConfig;
use crate::connectors::Connectors;
use crate::input::{PointerEvents, PointerState, PointerSubscription};
use crate::points::PointCloud;
use crate::spawn::SpawnContext;
use crate::time::FrameClock;

/// The animated background scene.
pub struct SceneHost {
    camera: Camera,
    clock: FrameClock,
    points: PointCloud,
    connectors: Connectors,
    pointer: PointerState,
    subscription: Option<PointerSubscription>,
    surface_size: (u32, u32),
}

impl SceneHost {
    /// Build the scene.
    ///
    /// Subscribes to `pointer_events` once, for the lifetime of the host. When
    /// no event source is available (headless use) nothing is registered and
    /// the pointer stays where [`set_pointer`](Self::set_pointer) puts it.
    pub fn new<R: Rng>(
        config: &FieldConfig,
        ctx: &mut SpawnContext<R>,
        pointer_events: Option<&PointerEvents>,
    ) -> Self {
        let surface_size = (config.layer.width, config.layer.height);
        let mut camera = Camera::new(&config.camera, 1.0);
        camera.set_viewport_size(surface_size.0, surface_size.1);

        let points = PointCloud::generate(config.point_count, ctx).with_influence(config.pointer);
        let connectors = Connectors::generate(config.segment_count, ctx);

        let subscription = pointer_events.map(PointerEvents::subscribe);
        if subscription.is_none() {
            tracing::debug!("no pointer event source, pointer interaction is inert");
        }

        tracing::info!(
            points = points.len(),
            segments = connectors.len(),
            "scene created"
        );

        Self {
            camera,
            clock: FrameClock::new(),
            points,
            connectors,
            pointer: PointerState::default(),
            subscription,
            surface_size,
        }
    }

    /// Advance both children to elapsed time `t` (seconds).
    pub fn tick(&mut self, t: f32) {
        if let Some(subscription) = &self.subscription {
            self.pointer = subscription.latest();
        }

        let viewport = self.viewport();
        self.points.update(t, self.pointer, viewport);
        self.connectors.update(t);
    }

    /// Tick using the host's own frame clock. Returns the elapsed time used.
    pub fn advance(&mut self) -> f32 {
        let t = self.clock.tick();
        self.tick(t);
        t
    }

    /// Track a new surface size. Zero-area sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_size = (width, height);
            self.camera.set_viewport_size(width, height);
            tracing::debug!(width, height, "scene resized");
        }
    }

    /// Override the pointer position. A live subscription replaces it on the next tick.
    pub fn set_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    #[inline]
    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn has_pointer_listener(&self) -> bool {
        self.subscription.is_some()
    }

    /// Visible area at the target plane, in scene units.
    pub fn viewport(&self) -> Vec2 {
        self.camera.viewport_at_target()
    }

    #[inline]
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[inline]
    pub fn points(&self) -> &PointCloud {
        &self.points
    }

    /// Mutable access for the renderer, which consumes the upload flag.
    #[inline]
    pub fn points_mut(&mut self) -> &mut PointCloud {
        &mut self.points
    }

    #[inline]
    pub fn connectors(&self) -> &Connectors {
        &self.connectors
    }

    pub fn view_projection(&self) -> Mat4 {
        self.camera.view_projection()
    }
}
