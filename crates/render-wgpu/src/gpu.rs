use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

use wavescope_common::{Color, Viewport};
use wavescope_render::{DrawCall, DrawError, GraphicsContext, RenderError};
use wavescope_surface::{grid_mesh, WaveParams, MAX_GRID_CELLS};

use crate::shaders;

/// Construction-time GPU failure. Fatal; surfaced immediately by the
/// driver.
#[derive(Debug, thiserror::Error)]
pub enum GpuInitError {
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter")]
    NoAdapter,
    #[error("failed to acquire graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SurfaceUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    normal_rot: [[f32; 4]; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PanelUniforms {
    transform: [[f32; 4]; 4],
    color: [f32; 4],
}

/// Static topology for one grid resolution, built on first use.
struct GridBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

enum PendingDraw {
    Surface {
        uniforms: SurfaceUniforms,
        resolution: usize,
        heights: Vec<f32>,
        normals: Vec<[f32; 3]>,
    },
    Panel {
        uniforms: PanelUniforms,
    },
}

struct PendingFrame {
    viewport: Viewport,
    clear_color: wgpu::Color,
    draws: Vec<PendingDraw>,
}

impl Default for PendingFrame {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            clear_color: wgpu::Color::BLACK,
            draws: Vec::new(),
        }
    }
}

/// wgpu-backed graphics context over a winit window surface.
pub struct WgpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    surface_pipeline: wgpu::RenderPipeline,
    panel_pipeline: wgpu::RenderPipeline,
    surface_bind_layout: wgpu::BindGroupLayout,
    panel_bind_layout: wgpu::BindGroupLayout,
    panel_vertex_buffer: wgpu::Buffer,
    grids: HashMap<usize, GridBuffers>,
    depth_texture: wgpu::TextureView,
    pending: PendingFrame,
}

impl WgpuContext {
    pub fn new(window: Arc<Window>) -> Result<Self, GpuInitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuInitError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("wavescope_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let surface_bind_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("surface_bind_layout"),
                entries: &[uniform_entry()],
            });
        let panel_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("panel_bind_layout"),
            entries: &[uniform_entry()],
        });

        let surface_pipeline = build_surface_pipeline(
            &device,
            surface_format,
            &surface_bind_layout,
        );
        let panel_pipeline = build_panel_pipeline(&device, surface_format, &panel_bind_layout);

        // Unit quad in [0, 1]^2, two triangles.
        let quad: [[f32; 2]; 6] = [
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
        ];
        let panel_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("panel_vertex_buffer"),
            contents: bytemuck::cast_slice(&quad),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_texture = create_depth_texture(&device, config.width, config.height);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            "GPU context initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            surface_pipeline,
            panel_pipeline,
            surface_bind_layout,
            panel_bind_layout,
            panel_vertex_buffer,
            grids: HashMap::new(),
            depth_texture,
            pending: PendingFrame::default(),
        })
    }

    /// Reconfigure the swapchain for a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    fn ensure_grid(&mut self, resolution: usize) {
        if self.grids.contains_key(&resolution) {
            return;
        }
        let (positions, indices) = grid_mesh(resolution);
        let vertices = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("grid_vertex_buffer"),
                contents: bytemuck::cast_slice(&positions),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("grid_index_buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.grids.insert(
            resolution,
            GridBuffers {
                vertices,
                indices: index_buffer,
                index_count: indices.len() as u32,
            },
        );
    }
}

impl GraphicsContext for WgpuContext {
    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.pending.viewport = viewport;
        Ok(())
    }

    fn clear(&mut self, color: Color) -> Result<(), RenderError> {
        self.pending.clear_color = wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: color.a as f64,
        };
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), DrawError> {
        match call {
            DrawCall::Surface(draw) => {
                let cells = draw.resolution.min(MAX_GRID_CELLS);
                let expected = (cells + 1) * (cells + 1);
                if draw.heights.len() != expected || draw.normals.len() != expected {
                    return Err(DrawError(format!(
                        "field size mismatch for resolution {}: {} heights, {} normals, expected {}",
                        draw.resolution,
                        draw.heights.len(),
                        draw.normals.len(),
                        expected
                    )));
                }
                self.pending.draws.push(PendingDraw::Surface {
                    uniforms: SurfaceUniforms {
                        view_proj: draw.view_projection.to_cols_array_2d(),
                        model: draw.model.to_cols_array_2d(),
                        normal_rot: draw.normal_rotation.to_cols_array_2d(),
                        params: [WaveParams::default().amplitude, 0.0, 0.0, 0.0],
                    },
                    resolution: draw.resolution,
                    heights: draw.heights.clone(),
                    normals: draw.normals.clone(),
                });
            }
            DrawCall::Panel(draw) => {
                self.pending.draws.push(PendingDraw::Panel {
                    uniforms: PanelUniforms {
                        transform: draw.transform.to_cols_array_2d(),
                        color: draw.color.to_array(),
                    },
                });
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        let frame = std::mem::take(&mut self.pending);

        if frame.viewport.is_empty() {
            tracing::trace!("skipping frame for empty viewport");
            return Ok(());
        }

        for draw in &frame.draws {
            if let PendingDraw::Surface { resolution, .. } = draw {
                self.ensure_grid(*resolution);
            }
        }

        let output = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::ContextUnavailable);
            }
            Err(e) => {
                return Err(RenderError::Context {
                    op: "finish",
                    message: e.to_string(),
                });
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        enum Prepared {
            Surface {
                bind_group: wgpu::BindGroup,
                heights: wgpu::Buffer,
                normals: wgpu::Buffer,
                resolution: usize,
            },
            Panel {
                bind_group: wgpu::BindGroup,
            },
        }

        let prepared: Vec<Prepared> = frame
            .draws
            .iter()
            .map(|draw| match draw {
                PendingDraw::Surface {
                    uniforms,
                    resolution,
                    heights,
                    normals,
                } => {
                    let uniform_buffer =
                        self.device
                            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("surface_uniforms"),
                                contents: bytemuck::bytes_of(uniforms),
                                usage: wgpu::BufferUsages::UNIFORM,
                            });
                    let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("surface_bind_group"),
                        layout: &self.surface_bind_layout,
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        }],
                    });
                    let heights =
                        self.device
                            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("height_buffer"),
                                contents: bytemuck::cast_slice(heights),
                                usage: wgpu::BufferUsages::VERTEX,
                            });
                    let normals =
                        self.device
                            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("normal_buffer"),
                                contents: bytemuck::cast_slice(normals),
                                usage: wgpu::BufferUsages::VERTEX,
                            });
                    Prepared::Surface {
                        bind_group,
                        heights,
                        normals,
                        resolution: *resolution,
                    }
                }
                PendingDraw::Panel { uniforms } => {
                    let uniform_buffer =
                        self.device
                            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("panel_uniforms"),
                                contents: bytemuck::bytes_of(uniforms),
                                usage: wgpu::BufferUsages::UNIFORM,
                            });
                    let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("panel_bind_group"),
                        layout: &self.panel_bind_layout,
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        }],
                    });
                    Prepared::Panel { bind_group }
                }
            })
            .collect();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            // The scene viewport can briefly disagree with the swapchain
            // during a resize; clamp to the attachment.
            let vw = frame.viewport.width.min(self.config.width) as f32;
            let vh = frame.viewport.height.min(self.config.height) as f32;
            pass.set_viewport(0.0, 0.0, vw, vh, 0.0, 1.0);

            for item in &prepared {
                match item {
                    Prepared::Panel { bind_group } => {
                        pass.set_pipeline(&self.panel_pipeline);
                        pass.set_bind_group(0, bind_group, &[]);
                        pass.set_vertex_buffer(0, self.panel_vertex_buffer.slice(..));
                        pass.draw(0..6, 0..1);
                    }
                    Prepared::Surface {
                        bind_group,
                        heights,
                        normals,
                        resolution,
                    } => {
                        let grid = &self.grids[resolution];
                        pass.set_pipeline(&self.surface_pipeline);
                        pass.set_bind_group(0, bind_group, &[]);
                        pass.set_vertex_buffer(0, grid.vertices.slice(..));
                        pass.set_vertex_buffer(1, heights.slice(..));
                        pass.set_vertex_buffer(2, normals.slice(..));
                        pass.set_index_buffer(grid.indices.slice(..), wgpu::IndexFormat::Uint16);
                        pass.draw_indexed(0..grid.index_count, 0, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn uniform_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn build_surface_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    bind_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("surface_shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::SURFACE_SHADER.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("surface_pipeline_layout"),
        bind_group_layouts: &[bind_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("surface_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_surface"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: 12,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                },
                wgpu::VertexBufferLayout {
                    array_stride: 4,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![1 => Float32],
                },
                wgpu::VertexBufferLayout {
                    array_stride: 12,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![2 => Float32x3],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_surface"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            // The surface is visible from both sides when tilted.
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn build_panel_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    bind_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("panel_shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::PANEL_SHADER.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("panel_pipeline_layout"),
        bind_group_layouts: &[bind_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("panel_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_panel"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: 8,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_panel"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        // Backdrops never occlude the surface.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
