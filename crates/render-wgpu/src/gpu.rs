use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use sketch_common::Size;
use sketch_scene::{GeometryData, Mesh, MeshId, PerspectiveCamera, Scene, Side, TextureImage};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MeshUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    time: f32,
    _pad: [f32; 3],
}

impl MeshUniforms {
    fn new(view_proj: Mat4, model: Mat4, time: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            time,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

fn gpu_vertices(data: &GeometryData) -> Vec<Vertex> {
    data.vertices
        .iter()
        .map(|v| Vertex {
            position: v.position,
            normal: v.normal,
            uv: v.uv,
        })
        .collect()
}

/// Faces to discard for a material side.
fn cull_mode(side: Side) -> Option<wgpu::Face> {
    match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Back => Some(wgpu::Face::Front),
        Side::Double => None,
    }
}

fn clear_color(rgba: [f64; 4]) -> wgpu::Color {
    wgpu::Color {
        r: rgba[0],
        g: rgba[1],
        b: rgba[2],
        a: rgba[3],
    }
}

/// True when the material's texture is not the image already bound.
fn needs_rebind(bound: Option<&TextureImage>, current: Option<&TextureImage>) -> bool {
    match (bound, current) {
        (None, None) => false,
        (Some(a), Some(b)) => !TextureImage::ptr_eq(a, b),
        _ => true,
    }
}

/// GPU resources for one scene mesh.
struct GpuMesh {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Image currently bound; `None` means the placeholder.
    bound_texture: Option<TextureImage>,
}

/// Off-screen attachments that follow the output size.
struct RenderTargets {
    depth: wgpu::TextureView,
    msaa: Option<wgpu::TextureView>,
}

/// wgpu-based scene renderer: one pipeline and buffer set per mesh.
pub struct WgpuRenderer {
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    placeholder: wgpu::TextureView,
    meshes: HashMap<MeshId, GpuMesh>,
    targets: RenderTargets,
    surface_format: wgpu::TextureFormat,
    sample_count: u32,
    clear: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        size: Size,
        sample_count: u32,
        clear_rgba: [f64; 4],
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mesh_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // The shader interface always has a texture slot; unset uniforms sample white.
        let placeholder = upload_rgba8(device, queue, "placeholder_texture", 1, 1, &[255; 4]);

        let targets = Self::create_targets(device, surface_format, size, sample_count);

        Self {
            bind_group_layout,
            pipeline_layout,
            sampler,
            placeholder,
            meshes: HashMap::new(),
            targets,
            surface_format,
            sample_count,
            clear: clear_color(clear_rgba),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: Size) {
        self.targets = Self::create_targets(device, self.surface_format, size, self.sample_count);
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Render one frame of every mesh in the scene into `view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) {
        self.meshes.retain(|id, _| scene.get(*id).is_some());

        let view_proj = camera.view_projection();
        for (id, mesh) in scene.meshes() {
            if !self.meshes.contains_key(id) {
                let gpu_mesh = self.create_mesh(device, queue, mesh);
                self.meshes.insert(*id, gpu_mesh);
                tracing::debug!(mesh = %id.0, "uploaded mesh to GPU");
            }
            let rebind = self.meshes.get(id).is_some_and(|g| {
                needs_rebind(g.bound_texture.as_ref(), mesh.material.uniforms.texture.as_ref())
            });
            if rebind {
                let texture = mesh.material.uniforms.texture.clone();
                let bind_group = self.create_bind_group(device, queue, id, texture.as_ref());
                if let Some(g) = self.meshes.get_mut(id) {
                    g.bind_group = bind_group;
                    g.bound_texture = texture;
                }
            }
            if let Some(g) = self.meshes.get(id) {
                let uniforms = MeshUniforms::new(
                    view_proj,
                    mesh.transform.matrix(),
                    mesh.material.uniforms.time,
                );
                queue.write_buffer(&g.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
            }
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let (color_view, resolve_target) = match &self.targets.msaa {
                Some(msaa) => (msaa, Some(view)),
                None => (view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for id in scene.meshes().keys() {
                let Some(g) = self.meshes.get(id) else {
                    continue;
                };
                pass.set_pipeline(&g.pipeline);
                pass.set_bind_group(0, &g.bind_group, &[]);
                pass.set_vertex_buffer(0, g.vertex_buffer.slice(..));
                pass.set_index_buffer(g.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..g.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_mesh(&self, device: &wgpu::Device, queue: &wgpu::Queue, mesh: &Mesh) -> GpuMesh {
        let material = &mesh.material;
        let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_vertex_shader"),
            source: wgpu::ShaderSource::Wgsl(material.vertex_shader.clone()),
        });
        let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_fragment_shader"),
            source: wgpu::ShaderSource::Wgsl(material.fragment_shader.clone()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: cull_mode(material.side),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        let data = mesh.geometry.build();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&gpu_vertices(&data)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_uniform_buffer"),
            contents: bytemuck::bytes_of(&MeshUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, 0.0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let texture = material.uniforms.texture.clone();
        let texture_view = texture
            .as_ref()
            .map(|img| upload_rgba8(device, queue, "mesh_texture", img.width(), img.height(), img.pixels()));
        let bind_group = self.bind(
            device,
            &uniform_buffer,
            texture_view.as_ref().unwrap_or(&self.placeholder),
        );

        GpuMesh {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            uniform_buffer,
            bind_group,
            bound_texture: texture,
        }
    }

    fn create_bind_group(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: &MeshId,
        texture: Option<&TextureImage>,
    ) -> wgpu::BindGroup {
        let view = texture.map(|img| {
            upload_rgba8(device, queue, "mesh_texture", img.width(), img.height(), img.pixels())
        });
        let uniform_buffer = &self.meshes[id].uniform_buffer;
        self.bind(device, uniform_buffer, view.as_ref().unwrap_or(&self.placeholder))
    }

    fn bind(
        &self,
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        texture: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    fn create_targets(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        size: Size,
        sample_count: u32,
    ) -> RenderTargets {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let depth = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("depth_texture"),
                size: extent,
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&Default::default());

        let msaa = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("msaa_color_texture"),
                    size: extent,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: surface_format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&Default::default())
        });

        RenderTargets { depth, msaa }
    }
}

fn upload_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_common::{EulerRotation, Transform};
    use sketch_scene::PlaneGeometry;

    #[test]
    fn uniform_block_matches_wgsl_layout() {
        // mat4x4 + mat4x4 + f32, rounded up to 16-byte struct alignment.
        assert_eq!(std::mem::size_of::<MeshUniforms>(), 144);
    }

    #[test]
    fn vertex_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn double_sided_disables_culling() {
        assert_eq!(cull_mode(Side::Double), None);
        assert_eq!(cull_mode(Side::Front), Some(wgpu::Face::Back));
        assert_eq!(cull_mode(Side::Back), Some(wgpu::Face::Front));
    }

    #[test]
    fn uniforms_carry_model_rotation() {
        let t = Transform {
            rotation: EulerRotation {
                x: 0.0005,
                y: 0.001,
                z: 0.0,
            },
            ..Transform::default()
        };
        let u = MeshUniforms::new(Mat4::IDENTITY, t.matrix(), 0.0);
        assert_eq!(u.model, t.matrix().to_cols_array_2d());
        assert_eq!(u.time, 0.0);
    }

    #[test]
    fn gpu_vertices_copy_geometry() {
        let data = PlaneGeometry::new(300.0, 200.0, 10, 10).build();
        let verts = gpu_vertices(&data);
        assert_eq!(verts.len(), 121);
        assert_eq!(verts[0].position, [-150.0, 100.0, 0.0]);
        assert_eq!(verts[0].uv, [0.0, 1.0]);
    }

    #[test]
    fn texture_rebind_follows_uniform_changes() {
        let image = TextureImage::from_rgba8(1, 1, vec![255, 0, 0, 255]).unwrap();
        let same_pixels = TextureImage::from_rgba8(1, 1, vec![255, 0, 0, 255]).unwrap();

        assert!(!needs_rebind(None, None));
        assert!(needs_rebind(None, Some(&image)));
        assert!(needs_rebind(Some(&image), None));
        assert!(!needs_rebind(Some(&image), Some(&image.clone())));
        // Equal contents in a new allocation still count as a new image.
        assert!(needs_rebind(Some(&image), Some(&same_pixels)));
    }

    #[test]
    fn clear_color_passthrough() {
        let c = clear_color([0.1, 0.2, 0.3, 1.0]);
        assert_eq!((c.r, c.g, c.b, c.a), (0.1, 0.2, 0.3, 1.0));
    }
}
