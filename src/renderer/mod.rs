//! wgpu rendering of a scene graph.
//!
//! The GPU surface, device and pipelines live in [`GpuRenderer`]. Geometry
//! buffers are uploaded lazily the first time a mesh referencing them is
//! drawn and cached for the scene's lifetime; textures are uploaded whenever
//! their async image arrives, with a 1x1 white pixel standing in before that.

mod pipeline;
pub mod texture;

use std::{collections::HashMap, sync::Arc};

use bytemuck::Zeroable;

use cgmath::{InnerSpace, Matrix4};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::PerspectiveCamera,
    geometry::Topology,
    lifecycle::WorldRenderer,
    light::Light,
    material::{Color, Material},
    scene::{NodeId, NodeKind, Scene},
    viewport::Resolution,
};

const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LightRaw {
    // w = 0 directional (xyz is the unit direction toward the light),
    // w = 1 point (xyz is the world position)
    position: [f32; 4],
    // rgb + intensity
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    light_count: [u32; 4],
    lights: [LightRaw; MAX_LIGHTS],
}

/// Per-draw vertex-stepped data: model matrix plus material constants.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ModelInstanceRaw {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    emissive: [f32; 4],
    // x lit, y flat shading, z toon
    flags: [f32; 4],
}

impl ModelInstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4,
    ];

    pub(crate) fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelInstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

struct GpuGeometry {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
    topology: Topology,
}

struct Draw {
    geometry: usize,
    texture: Option<u64>,
    instance: usize,
}

/// Renders one scene graph into one window surface.
pub struct GpuRenderer {
    #[allow(unused)]
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    surface_configured: bool,
    depth_texture: texture::Texture,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    default_texture_group: wgpu::BindGroup,
    geometries: HashMap<usize, GpuGeometry>,
    texture_groups: HashMap<u64, wgpu::BindGroup>,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL does not support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader assumes an srgb surface
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        let surface_configured = if size.width > 0 && size.height > 0 {
            surface.configure(&device, &config);
            true
        } else {
            false
        };

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Buffer"),
            contents: bytemuck::cast_slice(&[FrameUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("frame_bind_group_layout"),
            });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some("texture_bind_group_layout"),
            });

        let white = texture::Texture::create_default_white(&device, &queue);
        let default_texture_group =
            mk_texture_group(&device, &texture_bind_group_layout, &white, "default white");

        let mesh_pipeline = pipeline::mk_mesh_pipeline(
            &device,
            &config,
            &frame_bind_group_layout,
            &texture_bind_group_layout,
        );
        let line_pipeline = pipeline::mk_line_pipeline(
            &device,
            &config,
            &frame_bind_group_layout,
            &texture_bind_group_layout,
        );

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            surface_configured,
            depth_texture,
            mesh_pipeline,
            line_pipeline,
            frame_buffer,
            frame_bind_group,
            texture_bind_group_layout,
            default_texture_group,
            geometries: HashMap::new(),
            texture_groups: HashMap::new(),
        })
    }

    fn reconfigure(&mut self) {
        if self.config.width > 0 && self.config.height > 0 {
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = texture::Texture::create_depth_texture(
                &self.device,
                [self.config.width, self.config.height],
                "depth_texture",
            );
            self.surface_configured = true;
        }
    }

    /// Visibility of every node with its ancestors folded in. Parents come
    /// before children in the arena, one forward pass suffices.
    fn effective_visibility(scene: &Scene) -> Vec<bool> {
        let mut visible = Vec::new();
        for (_, node) in scene.iter() {
            let inherited = match node.parent() {
                Some(parent) => visible[parent.index()],
                None => true,
            };
            visible.push(inherited && node.visible);
        }
        visible
    }

    fn upload_geometry(&mut self, scene: &Scene, index: usize) {
        if self.geometries.contains_key(&index) {
            return;
        }
        let geometry = scene.geometry(crate::scene::GeometryId(index));
        let vertex = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.geometries.insert(
            index,
            GpuGeometry {
                vertex,
                index: index_buffer,
                index_count: geometry.indices.len() as u32,
                topology: geometry.topology,
            },
        );
    }

    fn frame_uniform(&self, scene: &Scene, camera: NodeId) -> anyhow::Result<FrameUniform> {
        let Some(projection) = scene.camera(camera) else {
            anyhow::bail!("render target node {} is not a camera", camera.index());
        };
        let camera_world = scene.node(camera).world_transform();
        let view = PerspectiveCamera::view_matrix(camera_world);
        let view_proj: Matrix4<f32> = projection.projection_matrix() * view;

        let mut lights = [LightRaw::zeroed(); MAX_LIGHTS];
        let mut count = 0usize;
        for (_, node) in scene.iter() {
            let NodeKind::Light(light) = &node.kind else {
                continue;
            };
            if count == MAX_LIGHTS {
                log::warn!("more than {} lights in scene, extra ones ignored", MAX_LIGHTS);
                break;
            }
            let position = node.world_transform().position;
            lights[count] = match light {
                Light::Directional {
                    color,
                    intensity,
                    target,
                    ..
                } => {
                    let direction = (position - target).normalize();
                    LightRaw {
                        position: [direction.x, direction.y, direction.z, 0.0],
                        color: [color.r, color.g, color.b, *intensity],
                    }
                }
                Light::Point { color, intensity } => LightRaw {
                    position: [position.x, position.y, position.z, 1.0],
                    color: [color.r, color.g, color.b, *intensity],
                },
            };
            count += 1;
        }

        Ok(FrameUniform {
            view_proj: view_proj.into(),
            camera_position: [
                camera_world.position.x,
                camera_world.position.y,
                camera_world.position.z,
                1.0,
            ],
            light_count: [count as u32, 0, 0, 0],
            lights,
        })
    }
}

fn mk_texture_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &texture::Texture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
        label: Some(label),
    })
}

fn instance_raw(model: Matrix4<f32>, material: &Material) -> ModelInstanceRaw {
    let color = material.color();
    let emissive = material.emissive();
    let flags = match material {
        Material::Basic { .. } | Material::Line { .. } => [0.0, 0.0, 0.0, 0.0],
        Material::Phong { flat_shading, .. } => {
            [1.0, if *flat_shading { 1.0 } else { 0.0 }, 0.0, 0.0]
        }
        Material::Toon { flat_shading, .. } => {
            [1.0, if *flat_shading { 1.0 } else { 0.0 }, 1.0, 0.0]
        }
    };
    ModelInstanceRaw {
        model: model.into(),
        color: [color.r, color.g, color.b, 1.0],
        emissive: [emissive.r, emissive.g, emissive.b, 1.0],
        flags,
    }
}

fn clear_color(background: Option<Color>) -> wgpu::Color {
    let Some(color) = background else {
        return wgpu::Color::BLACK;
    };
    // the surface is srgb, the clear value has to be linear
    fn to_linear(c: f32) -> f64 {
        let c = c as f64;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    wgpu::Color {
        r: to_linear(color.r),
        g: to_linear(color.g),
        b: to_linear(color.b),
        a: 1.0,
    }
}

impl WorldRenderer for GpuRenderer {
    fn backing_resolution(&self) -> Resolution {
        Resolution::new(self.config.width, self.config.height)
    }

    fn set_backing_resolution(&mut self, resolution: Resolution) {
        if resolution.width == 0 || resolution.height == 0 {
            return;
        }
        self.config.width = resolution.width;
        self.config.height = resolution.height;
        self.reconfigure();
    }

    fn render(&mut self, scene: &Scene, camera: NodeId) -> anyhow::Result<()> {
        if !self.surface_configured {
            return Ok(());
        }

        // cache fills happen before the pass borrows everything immutably
        let visible = Self::effective_visibility(scene);
        let mut draws = Vec::new();
        let mut instances = Vec::new();
        for (id, node) in scene.iter() {
            if !visible[id.index()] {
                continue;
            }
            let NodeKind::Mesh(mesh) = &node.kind else {
                continue;
            };
            self.upload_geometry(scene, mesh.geometry.index());

            let texture = match &mesh.material {
                Material::Basic {
                    map: Some(handle), ..
                } => {
                    if !self.texture_groups.contains_key(&handle.id()) {
                        if let Some(pixels) = handle.take_pixels() {
                            let uploaded = texture::Texture::from_image(
                                &self.device,
                                &self.queue,
                                &pixels,
                                Some("scene texture"),
                            );
                            let group = mk_texture_group(
                                &self.device,
                                &self.texture_bind_group_layout,
                                &uploaded,
                                "scene texture",
                            );
                            self.texture_groups.insert(handle.id(), group);
                        }
                    }
                    Some(handle.id())
                }
                _ => None,
            };

            instances.push(self.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Instance Buffer"),
                    contents: bytemuck::cast_slice(&[instance_raw(
                        node.world_transform().to_matrix(),
                        &mesh.material,
                    )]),
                    usage: wgpu::BufferUsages::VERTEX,
                },
            ));
            draws.push(Draw {
                geometry: mesh.geometry.index(),
                texture,
                instance: instances.len() - 1,
            });
        }

        let frame = self.frame_uniform(scene, camera)?;
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for wanted in [Topology::TriangleList, Topology::LineList] {
                match wanted {
                    Topology::TriangleList => render_pass.set_pipeline(&self.mesh_pipeline),
                    Topology::LineList => render_pass.set_pipeline(&self.line_pipeline),
                }
                for draw in draws.iter() {
                    let Some(geometry) = self.geometries.get(&draw.geometry) else {
                        continue;
                    };
                    if geometry.topology != wanted {
                        continue;
                    }
                    let texture_group = draw
                        .texture
                        .and_then(|key| self.texture_groups.get(&key))
                        .unwrap_or(&self.default_texture_group);
                    render_pass.set_bind_group(1, texture_group, &[]);
                    render_pass.set_vertex_buffer(0, geometry.vertex.slice(..));
                    render_pass.set_vertex_buffer(1, instances[draw.instance].slice(..));
                    render_pass
                        .set_index_buffer(geometry.index.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn dispose(&mut self) {
        log::info!("releasing renderer resources");
        self.geometries.clear();
        self.texture_groups.clear();
        self.surface_configured = false;
    }
}
