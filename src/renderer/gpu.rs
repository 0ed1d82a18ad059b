// renderer/gpu.rs
//! Device-facing seam. The drawer only ever talks to a `GpuBackend`; the wgpu
//! implementation and the headless one used by tests both sit behind it.

use crate::asset::Handle;
use crate::geometry::Topology;
use crate::renderer::{CullMode, DepthOverrides};

pub enum GpuMesh {}
pub enum GpuMaterial {}

pub type MeshHandle = Handle<GpuMesh>;
pub type MaterialHandle = Handle<GpuMaterial>;

#[derive(Debug, Clone, PartialEq)]
pub struct MeshDesc {
    pub label: String,
    pub topology: Topology,
    /// Initial vertex buffer size in bytes.
    pub vertex_bytes: usize,
    /// Initial index buffer size in 16-bit indices.
    pub index_count: usize,
}

/// Render state a material is compiled with. Depth fields are only set when
/// the draw overrode them.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub label: String,
    pub effect_id: String,
    pub technique: String,
    pub technique_index: usize,
    pub topology: Topology,
    pub cull: CullMode,
    pub depth: DepthOverrides,
    pub alpha_blend: bool,
    /// Per-vertex color when true, per-instance uniform color otherwise.
    pub use_vertex_color: bool,
}

pub trait GpuBackend {
    fn create_mesh(&mut self, desc: &MeshDesc) -> MeshHandle;

    /// Current vertex buffer allocation in bytes.
    fn vertex_capacity(&self, mesh: MeshHandle) -> usize;

    /// Current index buffer allocation in indices.
    fn index_capacity(&self, mesh: MeshHandle) -> usize;

    fn resize_vertex_buffer(&mut self, mesh: MeshHandle, bytes: usize);

    fn resize_index_buffer(&mut self, mesh: MeshHandle, count: usize);

    fn write_vertices(&mut self, mesh: MeshHandle, bytes: &[u8]);

    fn write_indices(&mut self, mesh: MeshHandle, indices: &[u16]);

    /// Limits what gets drawn to the first `vertex_count` / `index_count`
    /// elements, whatever the buffer capacity.
    fn set_draw_range(&mut self, mesh: MeshHandle, vertex_count: u32, index_count: u32);

    fn destroy_mesh(&mut self, mesh: MeshHandle);

    fn create_material(&mut self, desc: &MaterialDesc) -> MaterialHandle;

    fn destroy_material(&mut self, material: MaterialHandle);

    /// Grows the GPU allocations when needed, then writes exactly the given
    /// data and publishes the draw range.
    fn upload(&mut self, mesh: MeshHandle, vertex_bytes: &[u8], indices: &[u16], vertex_count: u32) {
        if vertex_bytes.len() > self.vertex_capacity(mesh) {
            self.resize_vertex_buffer(mesh, vertex_bytes.len());
        }
        if indices.len() > self.index_capacity(mesh) {
            self.resize_index_buffer(mesh, indices.len());
        }
        self.write_vertices(mesh, vertex_bytes);
        self.write_indices(mesh, indices);
        self.set_draw_range(mesh, vertex_count, indices.len() as u32);
    }
}
