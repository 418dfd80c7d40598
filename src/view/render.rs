//! Scene rendering. Owns the pipeline, per-eye camera uniforms, the depth
//! buffer and the egui pass, and turns a frame plan into GPU work.

use bytemuck::{Pod, Zeroable};

use crate::config::StereoMode;
use crate::controller::FramePlan;
use crate::model::Camera;
use crate::ui::UiFrame;
use crate::utils::{MeshBuffer, Vertex};
use crate::view::stereo::StereoContext;

/// View-projection matrix as consumed by the vertex stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

/// Directional sun plus ambient term. Written once at startup; the sun is
/// fixed relative to the scene, not the camera.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LightingUniform {
    sun_dir: [f32; 3],
    sun_intensity: f32,
    ambient: f32,
    _pad: [f32; 3],
}

const LIGHTING: LightingUniform = LightingUniform {
    sun_dir: [0.4, 0.8, 0.45],
    sun_intensity: 1.0,
    ambient: 0.35,
    _pad: [0.0; 3],
};

/// One uniform buffer and bind group per eye pass. Buffer writes are queued
/// ahead of a single submit, so passes in the same frame must not share a
/// slot.
struct CameraSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct CameraResources {
    bind_group_layout: wgpu::BindGroupLayout,
    slots: [CameraSlot; 2],
}

pub struct RenderState {
    width: u32,
    height: u32,
    pipeline: wgpu::RenderPipeline,
    camera_resources: CameraResources,
    depth_view: wgpu::TextureView,
    meshes: Vec<MeshBuffer>,
    stereo: Option<StereoContext>,
    egui_renderer: egui_wgpu::Renderer,
}

impl RenderState {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        mode: StereoMode,
        meshes: Vec<MeshBuffer>,
    ) -> Self {
        let camera_resources = create_camera_resources(device);
        let pipeline = create_scene_pipeline(device, format, &camera_resources.bind_group_layout);
        let depth_view = create_depth_texture(device, width, height);

        let stereo = match mode {
            StereoMode::SideBySide => Some(StereoContext::new(device, format, width, height)),
            StereoMode::Mono => None,
        };

        let egui_renderer =
            egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            width,
            height,
            pipeline,
            camera_resources,
            depth_view,
            meshes,
            stereo,
            egui_renderer,
        }
    }

    /// Record and submit one frame: the planned eye passes, the stereo
    /// composite if the plan asks for it, then the egui overlay.
    pub fn draw_frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface: &wgpu::Surface,
        camera: &Camera,
        plan: &FramePlan,
        ui_frame: UiFrame,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = surface.get_current_texture()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        for (i, eye_pass) in plan.passes.iter().enumerate() {
            let uniform = CameraUniform {
                view_proj: camera.view_proj(eye_pass.view).to_cols_array_2d(),
            };
            queue.write_buffer(
                &self.camera_resources.slots[i].buffer,
                0,
                bytemuck::bytes_of(&uniform),
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        for (i, eye_pass) in plan.passes.iter().enumerate() {
            let color_view = match (&self.stereo, plan.composite) {
                (Some(stereo), true) => &stereo.target_view,
                _ => &surface_view,
            };
            // The first pass clears the shared target, later passes add to it
            let (color_load, depth_load) = if i == 0 {
                (
                    wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    wgpu::LoadOp::Clear(1.0),
                )
            } else {
                (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let vp = eye_pass.viewport;
            pass.set_viewport(
                vp.x as f32,
                vp.y as f32,
                vp.width as f32,
                vp.height as f32,
                0.0,
                1.0,
            );
            pass.set_scissor_rect(vp.x, vp.y, vp.width, vp.height);

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.camera_resources.slots[i].bind_group, &[]);
            for mesh in &self.meshes {
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        if plan.composite {
            if let Some(stereo) = &self.stereo {
                stereo.display(&mut encoder, &surface_view);
            }
        }

        self.draw_ui(device, queue, &mut encoder, &surface_view, ui_frame);

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn draw_ui(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        ui_frame: UiFrame,
    ) {
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.width, self.height],
            pixels_per_point: ui_frame.pixels_per_point,
        };

        for (id, image_delta) in &ui_frame.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer.update_buffers(
            device,
            queue,
            encoder,
            &ui_frame.primitives,
            &screen_descriptor,
        );

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer.render(
                &mut pass.forget_lifetime(),
                &ui_frame.primitives,
                &screen_descriptor,
            );
        }

        for id in &ui_frame.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.depth_view = create_depth_texture(device, width, height);
        if let Some(stereo) = &mut self.stereo {
            stereo.resize(device, width, height);
        }
    }
}

fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
    use wgpu::util::DeviceExt;

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let lighting_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("lighting_buffer"),
        contents: bytemuck::bytes_of(&LIGHTING),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let make_slot = || {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting_buffer.as_entire_binding(),
                },
            ],
        });
        CameraSlot { buffer, bind_group }
    };
    let slots = [make_slot(), make_slot()];

    CameraResources {
        bind_group_layout,
        slots,
    }
}

fn create_scene_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader_src = include_str!("../shaders/scene.wgsl");
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene_pipeline_layout"),
        bind_group_layouts: &[camera_bind_group_layout],
        push_constant_ranges: &[],
    });

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: 40,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
