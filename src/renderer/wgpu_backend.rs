// renderer/wgpu_backend.rs
use std::collections::HashMap;
use std::mem;
use std::num::NonZeroU64;

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::gpu::{GpuBackend, MaterialDesc, MaterialHandle, MeshDesc, MeshHandle};
use super::pipeline_builder::{compare_function, PipelineBuilder};
use super::uniforms::{CameraUniform, ObjectData};
use super::vertex::DebugVertex;
use crate::error::DrawError;
use crate::renderer::CompareFunc;
use crate::scene::SceneGraph;

const INITIAL_OBJECTS_CAPACITY: u32 = 256;

struct WgpuMesh {
    label: String,
    vertex_buffer: wgpu::Buffer,
    vertex_size: usize,
    index_buffer: wgpu::Buffer,
    index_size: usize,
    index_count: u32,
}

struct WgpuMaterial {
    pipeline: wgpu::RenderPipeline,
}

struct PreparedDraw {
    mesh: usize,
    material: usize,
    object: u32,
}

/// wgpu implementation of the device seam. Renderer nodes are collected from
/// the scene in [`WgpuBackend::prepare`] and recorded in [`WgpuBackend::draw`].
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,

    vertex_color_shader: wgpu::ShaderModule,
    instance_color_shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,

    camera_buf: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    objects_buf: wgpu::Buffer,
    objects_capacity: u32,
    objects_bind_group: wgpu::BindGroup,
    objects_bind_layout: wgpu::BindGroupLayout,
    objects_scratch: Vec<ObjectData>,

    meshes: HashMap<usize, WgpuMesh>,
    materials: HashMap<usize, WgpuMaterial>,
    next_id: usize,
    draws: Vec<PreparedDraw>,
}

fn aligned(size: usize) -> u64 {
    let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
    (size.max(1).div_ceil(align) * align) as u64
}

impl WgpuBackend {
    /// Requests a device without a surface; the caller renders wherever it likes.
    pub async fn request(
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Result<Self, DrawError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| DrawError::Device(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("DebugDrawDevice"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| DrawError::Device(e.to_string()))?;

        Ok(Self::new(device, queue, color_format, depth_format))
    }

    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let camera = CameraUniform::default();
        let camera_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("DebugCameraBuffer"),
            contents: bytemuck::bytes_of(&camera),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("DebugCameraBindLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(mem::size_of::<CameraUniform>() as u64),
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("DebugCameraBindGroup"),
            layout: &camera_bind_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buf.as_entire_binding(),
            }],
        });

        let objects_bind_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("DebugObjectsBindLayout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let objects_capacity = INITIAL_OBJECTS_CAPACITY;
        let (objects_buf, objects_bind_group) =
            Self::create_objects_buffer(&device, &objects_bind_layout, objects_capacity);

        let vertex_color_shader = Self::create_shader(&device, true);
        let instance_color_shader = Self::create_shader(&device, false);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("DebugPipelineLayout"),
            bind_group_layouts: &[&camera_bind_layout, &objects_bind_layout],
            push_constant_ranges: &[],
        });

        Self {
            device,
            queue,
            color_format,
            depth_format,
            vertex_color_shader,
            instance_color_shader,
            pipeline_layout,
            camera_buf,
            camera_bind_group,
            objects_buf,
            objects_capacity,
            objects_bind_group,
            objects_bind_layout,
            objects_scratch: Vec::with_capacity(INITIAL_OBJECTS_CAPACITY as usize),
            meshes: HashMap::new(),
            materials: HashMap::new(),
            next_id: 0,
            draws: Vec::new(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn create_shader(device: &wgpu::Device, use_vertex_color: bool) -> wgpu::ShaderModule {
        let source = format!(
            "const USE_VERTEX_COLOR: bool = {};\n{}",
            use_vertex_color,
            include_str!("../shader/debug_unlit.wgsl")
        );
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(if use_vertex_color {
                "DebugUnlitVertexColor"
            } else {
                "DebugUnlitInstanceColor"
            }),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    }

    fn create_objects_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: u32,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("DebugObjectsBuffer"),
            size: (capacity as usize * mem::size_of::<ObjectData>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("DebugObjectsBindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        (buffer, bind_group)
    }

    fn create_buffer(&self, label: &str, size: usize, usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: aligned(size),
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn alloc_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uploads the camera and per-node data for every visible renderer node.
    pub fn prepare(&mut self, scene: &mut SceneGraph, view_proj: Mat4) {
        self.queue.write_buffer(
            &self.camera_buf,
            0,
            bytemuck::bytes_of(&CameraUniform::from_matrix(view_proj)),
        );

        self.draws.clear();
        self.objects_scratch.clear();
        for renderable in scene.renderables() {
            let mesh = renderable.renderer.mesh.index();
            let material = renderable.renderer.material.index();
            let drawable = self.meshes.get(&mesh).is_some_and(|m| m.index_count > 0)
                && self.materials.contains_key(&material);
            if !drawable {
                continue;
            }
            self.draws.push(PreparedDraw {
                mesh,
                material,
                object: self.objects_scratch.len() as u32,
            });
            self.objects_scratch
                .push(ObjectData::new(renderable.model, renderable.renderer.color));
        }

        let required = self.objects_scratch.len() as u32;
        if required > self.objects_capacity {
            let new_capacity = required.max(self.objects_capacity * 2);
            log::info!(
                "Growing debug objects buffer: {} -> {}",
                self.objects_capacity,
                new_capacity
            );
            let (buffer, bind_group) =
                Self::create_objects_buffer(&self.device, &self.objects_bind_layout, new_capacity);
            self.objects_buf = buffer;
            self.objects_bind_group = bind_group;
            self.objects_capacity = new_capacity;
        }

        if !self.objects_scratch.is_empty() {
            self.queue.write_buffer(
                &self.objects_buf,
                0,
                bytemuck::cast_slice(&self.objects_scratch),
            );
        }
    }

    /// Records the draws gathered by the last `prepare`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_bind_group(1, &self.objects_bind_group, &[]);

        for draw in &self.draws {
            let (Some(mesh), Some(material)) =
                (self.meshes.get(&draw.mesh), self.materials.get(&draw.material))
            else {
                continue;
            };
            pass.set_pipeline(&material.pipeline);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..mesh.index_count, 0, draw.object..draw.object + 1);
        }
    }

    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }
}

impl GpuBackend for WgpuBackend {
    fn create_mesh(&mut self, desc: &MeshDesc) -> MeshHandle {
        let vertex_buffer = self.create_buffer(
            &format!("{}_vertices", desc.label),
            desc.vertex_bytes,
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = self.create_buffer(
            &format!("{}_indices", desc.label),
            desc.index_count * mem::size_of::<u16>(),
            wgpu::BufferUsages::INDEX,
        );
        let id = self.alloc_id();
        self.meshes.insert(
            id,
            WgpuMesh {
                label: desc.label.clone(),
                vertex_buffer,
                vertex_size: desc.vertex_bytes,
                index_buffer,
                index_size: desc.index_count,
                index_count: 0,
            },
        );
        MeshHandle::new(id)
    }

    fn vertex_capacity(&self, mesh: MeshHandle) -> usize {
        self.meshes.get(&mesh.index()).map_or(0, |m| m.vertex_size)
    }

    fn index_capacity(&self, mesh: MeshHandle) -> usize {
        self.meshes.get(&mesh.index()).map_or(0, |m| m.index_size)
    }

    fn resize_vertex_buffer(&mut self, mesh: MeshHandle, bytes: usize) {
        let Some(label) = self.meshes.get(&mesh.index()).map(|m| m.label.clone()) else {
            return;
        };
        let buffer = self.create_buffer(
            &format!("{}_vertices", label),
            bytes,
            wgpu::BufferUsages::VERTEX,
        );
        if let Some(m) = self.meshes.get_mut(&mesh.index()) {
            m.vertex_buffer.destroy();
            m.vertex_buffer = buffer;
            m.vertex_size = bytes;
        }
    }

    fn resize_index_buffer(&mut self, mesh: MeshHandle, count: usize) {
        let Some(label) = self.meshes.get(&mesh.index()).map(|m| m.label.clone()) else {
            return;
        };
        let buffer = self.create_buffer(
            &format!("{}_indices", label),
            count * mem::size_of::<u16>(),
            wgpu::BufferUsages::INDEX,
        );
        if let Some(m) = self.meshes.get_mut(&mesh.index()) {
            m.index_buffer.destroy();
            m.index_buffer = buffer;
            m.index_size = count;
        }
    }

    fn write_vertices(&mut self, mesh: MeshHandle, bytes: &[u8]) {
        if let Some(m) = self.meshes.get(&mesh.index()) {
            // Vertices are 28 bytes, so whole-vertex writes are already 4-aligned.
            self.queue.write_buffer(&m.vertex_buffer, 0, bytes);
        }
    }

    fn write_indices(&mut self, mesh: MeshHandle, indices: &[u16]) {
        let Some(m) = self.meshes.get(&mesh.index()) else {
            return;
        };
        if indices.len() % 2 == 0 {
            self.queue
                .write_buffer(&m.index_buffer, 0, bytemuck::cast_slice(indices));
        } else {
            // Pad odd counts to the copy alignment; the draw range hides the pad.
            let mut padded = Vec::with_capacity(indices.len() + 1);
            padded.extend_from_slice(indices);
            padded.push(0);
            self.queue
                .write_buffer(&m.index_buffer, 0, bytemuck::cast_slice(&padded));
        }
    }

    fn set_draw_range(&mut self, mesh: MeshHandle, _vertex_count: u32, index_count: u32) {
        if let Some(m) = self.meshes.get_mut(&mesh.index()) {
            m.index_count = index_count;
        }
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        if let Some(m) = self.meshes.remove(&mesh.index()) {
            m.vertex_buffer.destroy();
            m.index_buffer.destroy();
        }
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> MaterialHandle {
        let shader = if desc.use_vertex_color {
            &self.vertex_color_shader
        } else {
            &self.instance_color_shader
        };
        let blend = if desc.alpha_blend {
            Some(wgpu::BlendState::ALPHA_BLENDING)
        } else {
            Some(wgpu::BlendState::REPLACE)
        };

        let mut builder = PipelineBuilder::new(&self.device, &self.pipeline_layout, shader)
            .with_label(&desc.label)
            .with_vertex_buffer(DebugVertex::layout())
            .with_color_target(self.color_format, blend)
            .with_topology(desc.topology)
            .with_cull_mode(desc.cull);

        if let Some(format) = self.depth_format {
            let test = desc.depth.test.unwrap_or(true);
            let write = desc.depth.write.unwrap_or(!desc.alpha_blend);
            let func = if test {
                desc.depth.func.unwrap_or(CompareFunc::LessEqual)
            } else {
                CompareFunc::Always
            };
            builder = builder.with_depth_stencil(format, write, compare_function(func));
        }

        let pipeline = builder.build();
        let id = self.alloc_id();
        self.materials.insert(id, WgpuMaterial { pipeline });
        MaterialHandle::new(id)
    }

    fn destroy_material(&mut self, material: MaterialHandle) {
        self.materials.remove(&material.index());
    }
}
