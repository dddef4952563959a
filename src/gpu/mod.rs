//! GPU presentation of the scene.
//!
//! Three pipelines share one render pass: additive point sprites, faint line
//! segments and an optional full-surface gradient overlay. Point positions
//! are re-uploaded whenever the cloud flags them; colors, sizes and segment
//! endpoints are uploaded once at creation.

mod shaders;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::FieldConfig;
use crate::error::GpuError;
use crate::points::PointAttributes;
use crate::scene::SceneHost;
use crate::visuals::{BlendMode, GradientOverlay, LineMaterial, PointMaterial};
use shaders::{DrawUniforms, OverlayUniforms, LINES_SOURCE, OVERLAY_SOURCE, POINTS_SOURCE};

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const POINT_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32];

/// Renderer state bound to one window surface.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    msaa_view: Option<wgpu::TextureView>,
    clear_color: wgpu::Color,
    point_material: PointMaterial,
    line_material: LineMaterial,
    ambient_intensity: f32,

    point_pipeline: wgpu::RenderPipeline,
    point_positions: wgpu::Buffer,
    point_attributes: wgpu::Buffer,
    point_uniforms: wgpu::Buffer,
    point_bind_group: wgpu::BindGroup,
    num_points: u32,

    line_pipeline: wgpu::RenderPipeline,
    line_vertices: wgpu::Buffer,
    line_uniforms: wgpu::Buffer,
    line_bind_group: wgpu::BindGroup,
    num_line_vertices: u32,

    overlay: Option<(wgpu::RenderPipeline, wgpu::BindGroup)>,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        field: &FieldConfig,
        scene: &SceneHost,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU adapter selected");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = choose_alpha_mode(&surface_caps.alpha_modes, field.layer.transparent);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        tracing::debug!(format = ?surface_format, alpha_mode = ?alpha_mode, "surface configured");

        let sample_count = field.layer.sample_count();
        let msaa_view = create_msaa_view(&device, &config, sample_count);

        let clear_color = if field.layer.transparent {
            wgpu::Color::TRANSPARENT
        } else {
            let [r, g, b] = field.overlay.color;
            wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            }
        };

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let targets = PipelineTargets {
            format: config.format,
            sample_count,
            layout: &uniform_layout,
        };

        // Points
        let points = scene.points();
        let point_positions = vertex_buffer(
            &device,
            "Point Position Buffer",
            bytemuck::cast_slice(points.positions()),
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );
        let point_attributes = vertex_buffer(
            &device,
            "Point Attribute Buffer",
            bytemuck::cast_slice(&points.attributes()),
            wgpu::BufferUsages::VERTEX,
        );
        let (point_uniforms, point_bind_group) =
            uniform_binding::<DrawUniforms>(&device, "Point Uniforms", &uniform_layout);

        let point_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<glam::Vec3>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &POSITION_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointAttributes>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &POINT_ATTRIBUTES,
            },
        ];
        let point_pipeline = create_pipeline(
            &device,
            &targets,
            "Point Pipeline",
            POINTS_SOURCE,
            &point_buffers,
            wgpu::PrimitiveTopology::TriangleList,
            blend_state(field.points.blend),
        );

        // Lines
        let connectors = scene.connectors();
        let line_vertices = vertex_buffer(
            &device,
            "Line Vertex Buffer",
            bytemuck::cast_slice(connectors.segments()),
            wgpu::BufferUsages::VERTEX,
        );
        let (line_uniforms, line_bind_group) =
            uniform_binding::<DrawUniforms>(&device, "Line Uniforms", &uniform_layout);

        let line_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<glam::Vec3>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRIBUTES,
        }];
        let line_pipeline = create_pipeline(
            &device,
            &targets,
            "Line Pipeline",
            LINES_SOURCE,
            &line_buffers,
            wgpu::PrimitiveTopology::LineList,
            blend_state(BlendMode::Alpha),
        );

        // Overlay
        let overlay = field.overlay.enabled.then(|| {
            create_overlay(&device, &queue, &targets, &uniform_layout, &field.overlay)
        });

        tracing::info!(
            points = points.len(),
            segments = connectors.len(),
            sample_count,
            "renderer ready"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sample_count,
            msaa_view,
            clear_color,
            point_material: field.points,
            line_material: field.lines,
            ambient_intensity: field.ambient_intensity,
            point_pipeline,
            point_positions,
            point_attributes,
            point_uniforms,
            point_bind_group,
            num_points: points.len() as u32,
            line_pipeline,
            line_vertices,
            line_uniforms,
            line_bind_group,
            num_line_vertices: (connectors.len() * 2) as u32,
            overlay,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.msaa_view = create_msaa_view(&self.device, &self.config, self.sample_count);
        }
    }

    /// Re-apply the current surface configuration, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.resize(winit::dpi::PhysicalSize::new(self.config.width, self.config.height));
    }

    fn update_uniforms(&mut self, scene: &SceneHost) {
        let view_proj = scene.view_projection().to_cols_array_2d();
        let viewport = [
            self.config.width as f32,
            self.config.height as f32,
            self.config.width as f32 / self.config.height as f32,
            0.0,
        ];

        let points = DrawUniforms {
            view_proj,
            model: scene.points().model_matrix().to_cols_array_2d(),
            color: [1.0, 1.0, 1.0, self.point_material.opacity],
            params: [
                self.point_material.size,
                if self.point_material.size_attenuation { 1.0 } else { 0.0 },
                self.ambient_intensity,
                0.0,
            ],
            viewport,
        };
        self.queue
            .write_buffer(&self.point_uniforms, 0, bytemuck::bytes_of(&points));

        let [r, g, b] = self.line_material.color;
        let lines = DrawUniforms {
            view_proj,
            model: scene.connectors().model_matrix().to_cols_array_2d(),
            color: [r, g, b, self.line_material.opacity],
            params: [0.0, 0.0, self.ambient_intensity, 0.0],
            viewport,
        };
        self.queue
            .write_buffer(&self.line_uniforms, 0, bytemuck::bytes_of(&lines));
    }

    /// Draw and present one frame of the scene.
    pub fn render(&mut self, scene: &mut SceneHost) -> Result<(), wgpu::SurfaceError> {
        if scene.points_mut().take_needs_upload() && self.num_points > 0 {
            self.queue.write_buffer(
                &self.point_positions,
                0,
                bytemuck::cast_slice(scene.points().positions()),
            );
        }
        self.update_uniforms(scene);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            // With MSAA we draw into the multisampled target and resolve into the surface.
            let (target, resolve_target, store) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&view), wgpu::StoreOp::Discard),
                None => (&view, None, wgpu::StoreOp::Store),
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if self.num_points > 0 {
                render_pass.set_pipeline(&self.point_pipeline);
                render_pass.set_bind_group(0, &self.point_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.point_positions.slice(..));
                render_pass.set_vertex_buffer(1, self.point_attributes.slice(..));
                render_pass.draw(0..6, 0..self.num_points);
            }

            if self.num_line_vertices > 0 {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_bind_group(0, &self.line_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.line_vertices.slice(..));
                render_pass.draw(0..self.num_line_vertices, 0..1);
            }

            if let Some((pipeline, bind_group)) = &self.overlay {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

struct PipelineTargets<'a> {
    format: wgpu::TextureFormat,
    sample_count: u32,
    layout: &'a wgpu::BindGroupLayout,
}

fn create_pipeline(
    device: &wgpu::Device,
    targets: &PipelineTargets<'_>,
    label: &str,
    source: &str,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
    blend: wgpu::BlendState,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[targets.layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: targets.format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: targets.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

fn create_overlay(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    targets: &PipelineTargets<'_>,
    layout: &wgpu::BindGroupLayout,
    overlay: &GradientOverlay,
) -> (wgpu::RenderPipeline, wgpu::BindGroup) {
    let (buffer, bind_group) = uniform_binding::<OverlayUniforms>(device, "Overlay Uniforms", layout);
    let [r, g, b] = overlay.color;
    let uniforms = OverlayUniforms {
        color: [r, g, b, 1.0],
        params: [overlay.fade_start, 0.0, 0.0, 0.0],
    };
    queue.write_buffer(&buffer, 0, bytemuck::bytes_of(&uniforms));

    let pipeline = create_pipeline(
        device,
        targets,
        "Overlay Pipeline",
        OVERLAY_SOURCE,
        &[],
        wgpu::PrimitiveTopology::TriangleList,
        blend_state(BlendMode::Alpha),
    );

    (pipeline, bind_group)
}

/// Uniform buffer of `T` plus a bind group exposing it at binding 0.
///
/// The bind group keeps the buffer alive, the buffer is returned for writes.
fn uniform_binding<T: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });

    (buffer, bind_group)
}

/// Vertex buffer initialized with `contents`. Empty contents still get a
/// small allocation so the buffer is always bindable.
fn vertex_buffer(
    device: &wgpu::Device,
    label: &str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    const EMPTY: [u8; 16] = [0; 16];
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: if contents.is_empty() { &EMPTY } else { contents },
        usage,
    })
}

fn create_msaa_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("MSAA Color Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

pub(crate) fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

/// Pick how the compositor treats surface alpha.
///
/// Transparent layers prefer premultiplied alpha, which matches what both
/// blend states produce on a transparent clear.
pub(crate) fn choose_alpha_mode(
    available: &[wgpu::CompositeAlphaMode],
    transparent: bool,
) -> wgpu::CompositeAlphaMode {
    use wgpu::CompositeAlphaMode as Mode;

    let preferred: &[Mode] = if transparent {
        &[Mode::PreMultiplied, Mode::PostMultiplied, Mode::Inherit]
    } else {
        &[Mode::Opaque]
    };

    preferred
        .iter()
        .copied()
        .find(|mode| available.contains(mode))
        .or_else(|| available.first().copied())
        .unwrap_or(Mode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::CompositeAlphaMode as Mode;

    #[test]
    fn test_alpha_mode_prefers_premultiplied() {
        let modes = [Mode::Opaque, Mode::PostMultiplied, Mode::PreMultiplied];
        assert_eq!(choose_alpha_mode(&modes, true), Mode::PreMultiplied);
    }

    #[test]
    fn test_alpha_mode_falls_back() {
        assert_eq!(choose_alpha_mode(&[Mode::Opaque], true), Mode::Opaque);
        assert_eq!(choose_alpha_mode(&[], true), Mode::Auto);
    }

    #[test]
    fn test_alpha_mode_opaque_when_not_transparent() {
        let modes = [Mode::PreMultiplied, Mode::Opaque];
        assert_eq!(choose_alpha_mode(&modes, false), Mode::Opaque);
    }

    #[test]
    fn test_additive_blend_adds() {
        let state = blend_state(BlendMode::Additive);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.operation, wgpu::BlendOperation::Add);
        assert_eq!(blend_state(BlendMode::Alpha), wgpu::BlendState::ALPHA_BLENDING);
    }
}
