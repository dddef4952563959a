//! Background-layer window and render loop.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId, WindowLevel},
};

use crate::config::FieldConfig;
use crate::error::FieldError;
use crate::gpu::GpuState;
use crate::input::PointerEvents;
use crate::scene::SceneHost;
use crate::spawn::SpawnContext;

pub struct App {
    config: FieldConfig,
    pointer_events: PointerEvents,
    window: Option<Arc<Window>>,
    scene: Option<SceneHost>,
    gpu_state: Option<GpuState>,
    error: Option<FieldError>,
}

impl App {
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            pointer_events: PointerEvents::new(),
            window: None,
            scene: None,
            gpu_state: None,
            error: None,
        }
    }

    /// The error that stopped the loop, if any.
    pub fn take_error(&mut self) -> Option<FieldError> {
        self.error.take()
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>, FieldError> {
        let layer = &self.config.layer;
        let mut window_attrs = Window::default_attributes()
            .with_title(layer.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(layer.width, layer.height))
            .with_transparent(layer.transparent)
            .with_decorations(false)
            .with_maximized(layer.maximized);
        if layer.always_on_bottom {
            window_attrs = window_attrs.with_window_level(WindowLevel::AlwaysOnBottom);
        }

        let window = event_loop.create_window(window_attrs)?;
        if layer.click_through {
            if let Err(e) = window.set_cursor_hittest(false) {
                tracing::warn!(error = %e, "click-through is not supported here, the layer will capture input");
            }
        }

        Ok(Arc::new(window))
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), FieldError> {
        let window = match &self.window {
            Some(window) => window.clone(),
            None => {
                let window = self.create_window(event_loop)?;
                self.window = Some(window.clone());
                window
            }
        };

        let size = window.inner_size();
        self.pointer_events.set_window_size(size.width, size.height);

        let scene = self.scene.get_or_insert_with(|| {
            let mut ctx = SpawnContext::from_seed_option(self.config.seed);
            SceneHost::new(&self.config, &mut ctx, Some(&self.pointer_events))
        });
        scene.resize(size.width, size.height);

        self.gpu_state = Some(pollster::block_on(GpuState::new(
            window.clone(),
            &self.config,
            scene,
        ))?);
        window.request_redraw();
        Ok(())
    }

    /// Stop rendering and drop the scene, which also removes its pointer listener.
    fn teardown(&mut self) {
        self.gpu_state = None;
        self.scene = None;
        self.window = None;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: FieldError) {
        tracing::error!(%error, "particle field stopped");
        self.error = Some(error);
        self.teardown();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu_state.is_none() {
            if let Err(e) = self.start(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        // The surface is invalid while suspended; it is rebuilt on resume.
        self.gpu_state = None;
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.pointer_events.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
                if let Some(scene) = &mut self.scene {
                    scene.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let (Some(gpu_state), Some(scene)) = (&mut self.gpu_state, &mut self.scene) {
                    scene.advance();
                    match gpu_state.render(scene) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.reconfigure()
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            self.teardown();
                            tracing::error!("GPU out of memory");
                            event_loop.exit();
                            return;
                        }
                        Err(e) => tracing::warn!(error = ?e, "frame skipped"),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
