// renderer/headless.rs
//! CPU-memory backend. Keeps every uploaded byte so tests and the headless
//! demo can inspect exactly what a real device would have received.

use std::collections::HashMap;

use super::gpu::{GpuBackend, MaterialDesc, MaterialHandle, MeshDesc, MeshHandle};
use super::vertex::FLOATS_PER_VERTEX;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub vertex_writes: usize,
    pub index_writes: usize,
    pub vertex_bytes: usize,
    pub index_bytes: usize,
    pub vertex_resizes: usize,
    pub index_resizes: usize,
}

#[derive(Debug, Clone)]
pub struct HeadlessMesh {
    pub desc: MeshDesc,
    pub vertex_data: Vec<u8>,
    pub index_data: Vec<u16>,
    pub vertex_count: u32,
    pub index_count: u32,
}

impl HeadlessMesh {
    /// Position of the drawn vertex `i`.
    pub fn position(&self, i: usize) -> Option<[f32; 3]> {
        let start = i * FLOATS_PER_VERTEX * std::mem::size_of::<f32>();
        self.vertex_data
            .get(start..start + 12)
            .map(bytemuck::pod_read_unaligned::<[f32; 3]>)
    }

    pub fn drawn_indices(&self) -> &[u16] {
        &self.index_data[..(self.index_count as usize).min(self.index_data.len())]
    }
}

#[derive(Default)]
pub struct HeadlessBackend {
    meshes: HashMap<usize, HeadlessMesh>,
    materials: HashMap<usize, MaterialDesc>,
    next_id: usize,
    stats: UploadStats,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, mesh: MeshHandle) -> Option<&HeadlessMesh> {
        self.meshes.get(&mesh.index())
    }

    pub fn material(&self, material: MaterialHandle) -> Option<&MaterialDesc> {
        self.materials.get(&material.index())
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn stats(&self) -> &UploadStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = UploadStats::default();
    }

    fn alloc_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn mesh_mut(
        meshes: &mut HashMap<usize, HeadlessMesh>,
        mesh: MeshHandle,
    ) -> Option<&mut HeadlessMesh> {
        let found = meshes.get_mut(&mesh.index());
        if found.is_none() {
            log::warn!("Headless backend: unknown mesh {:?}", mesh);
        }
        found
    }
}

impl GpuBackend for HeadlessBackend {
    fn create_mesh(&mut self, desc: &MeshDesc) -> MeshHandle {
        let id = self.alloc_id();
        self.meshes.insert(
            id,
            HeadlessMesh {
                desc: desc.clone(),
                vertex_data: vec![0; desc.vertex_bytes],
                index_data: vec![0; desc.index_count],
                vertex_count: 0,
                index_count: 0,
            },
        );
        MeshHandle::new(id)
    }

    fn vertex_capacity(&self, mesh: MeshHandle) -> usize {
        self.mesh(mesh).map_or(0, |m| m.vertex_data.len())
    }

    fn index_capacity(&self, mesh: MeshHandle) -> usize {
        self.mesh(mesh).map_or(0, |m| m.index_data.len())
    }

    fn resize_vertex_buffer(&mut self, mesh: MeshHandle, bytes: usize) {
        if let Some(m) = Self::mesh_mut(&mut self.meshes, mesh) {
            m.vertex_data.resize(bytes, 0);
            self.stats.vertex_resizes += 1;
        }
    }

    fn resize_index_buffer(&mut self, mesh: MeshHandle, count: usize) {
        if let Some(m) = Self::mesh_mut(&mut self.meshes, mesh) {
            m.index_data.resize(count, 0);
            self.stats.index_resizes += 1;
        }
    }

    fn write_vertices(&mut self, mesh: MeshHandle, bytes: &[u8]) {
        if let Some(m) = Self::mesh_mut(&mut self.meshes, mesh) {
            assert!(bytes.len() <= m.vertex_data.len(), "vertex write past buffer end");
            m.vertex_data[..bytes.len()].copy_from_slice(bytes);
            self.stats.vertex_writes += 1;
            self.stats.vertex_bytes += bytes.len();
        }
    }

    fn write_indices(&mut self, mesh: MeshHandle, indices: &[u16]) {
        if let Some(m) = Self::mesh_mut(&mut self.meshes, mesh) {
            assert!(indices.len() <= m.index_data.len(), "index write past buffer end");
            m.index_data[..indices.len()].copy_from_slice(indices);
            self.stats.index_writes += 1;
            self.stats.index_bytes += std::mem::size_of_val(indices);
        }
    }

    fn set_draw_range(&mut self, mesh: MeshHandle, vertex_count: u32, index_count: u32) {
        if let Some(m) = Self::mesh_mut(&mut self.meshes, mesh) {
            m.vertex_count = vertex_count;
            m.index_count = index_count;
        }
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        self.meshes.remove(&mesh.index());
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> MaterialHandle {
        let id = self.alloc_id();
        self.materials.insert(id, desc.clone());
        MaterialHandle::new(id)
    }

    fn destroy_material(&mut self, material: MaterialHandle) {
        self.materials.remove(&material.index());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Topology;

    fn desc(vertex_bytes: usize, index_count: usize) -> MeshDesc {
        MeshDesc {
            label: "test".into(),
            topology: Topology::TriangleList,
            vertex_bytes,
            index_count,
        }
    }

    #[test]
    fn upload_grows_and_sets_range() {
        let mut gpu = HeadlessBackend::new();
        let mesh = gpu.create_mesh(&desc(4, 1));
        let floats = [1.0f32; 14];
        gpu.upload(mesh, bytemuck::cast_slice(&floats), &[0, 1, 1], 2);

        let m = gpu.mesh(mesh).unwrap();
        assert_eq!(m.vertex_data.len(), 56);
        assert_eq!(m.drawn_indices(), &[0, 1, 1]);
        assert_eq!(m.vertex_count, 2);
        assert_eq!(gpu.stats().vertex_resizes, 1);
        assert_eq!(gpu.stats().index_resizes, 1);
    }

    #[test]
    fn destroyed_mesh_is_forgotten() {
        let mut gpu = HeadlessBackend::new();
        let mesh = gpu.create_mesh(&desc(28, 3));
        gpu.destroy_mesh(mesh);
        assert!(gpu.mesh(mesh).is_none());
        assert_eq!(gpu.vertex_capacity(mesh), 0);
    }
}
