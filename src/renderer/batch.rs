// renderer/batch.rs
use glam::{Mat4, Vec4};

use super::buffer::GrowableBuffer;
use super::gpu::{GpuBackend, MeshDesc, MeshHandle};
use super::vertex::FLOATS_PER_VERTEX;
use crate::geometry::{Geometry, IndexExpansion, Topology};

/// Vertices addressable by a 16-bit index buffer.
pub const MAX_BATCH_VERTICES: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was appended this frame; the GPU mesh should not be drawn.
    Inactive,
    Uploaded { vertex_count: u32, index_count: u32 },
}

/// Interleaved position+color vertices and 16-bit indices for one render
/// state. Logical counts are reset every frame; capacity only grows.
pub struct MeshBatch {
    label: String,
    topology: Topology,
    vertices: GrowableBuffer<f32>,
    indices: GrowableBuffer<u16>,
    vertex_count: usize,
    index_count: usize,
    /// Appends refused since the last reset.
    dropped: usize,
    mesh: Option<MeshHandle>,
}

impl MeshBatch {
    pub fn new(
        label: impl Into<String>,
        topology: Topology,
        vertex_floats: usize,
        index_capacity: usize,
    ) -> Self {
        Self {
            label: label.into(),
            topology,
            vertices: GrowableBuffer::with_capacity("vertex", vertex_floats),
            indices: GrowableBuffer::with_capacity("index", index_capacity),
            vertex_count: 0,
            index_count: 0,
            dropped: 0,
            mesh: None,
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Vertex buffer capacity in floats.
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity()
    }

    pub fn index_capacity(&self) -> usize {
        self.indices.capacity()
    }

    /// Logical vertex data, `vertex_count * 7` floats.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices.as_slice()[..self.vertex_count * FLOATS_PER_VERTEX]
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices.as_slice()[..self.index_count]
    }

    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    /// Transforms and colors `geometry` into the batch, rebasing its indices
    /// onto the current vertex count. Returns false, leaving the batch
    /// untouched, if the result would not be addressable with 16-bit indices.
    pub fn append(
        &mut self,
        geometry: &Geometry,
        expansion: IndexExpansion,
        transform: &Mat4,
        color: Vec4,
    ) -> bool {
        if !geometry.indices_in_range() {
            log::warn!(
                "Batch `{}`: geometry indexes past its {} vertices; dropping it",
                self.label,
                geometry.vertex_count()
            );
            self.dropped += 1;
            return false;
        }

        let base = self.vertex_count;
        let added = geometry.vertex_count();
        if base + added > MAX_BATCH_VERTICES {
            if self.dropped == 0 {
                log::warn!(
                    "Batch `{}` is full ({} vertices); dropping further draws this frame",
                    self.label,
                    base
                );
            }
            self.dropped += 1;
            return false;
        }

        let vertex_end = base + added;
        let index_start = self.index_count;
        let index_end = index_start + expansion.expanded_len(geometry.index_count());

        self.vertices.reserve(vertex_end * FLOATS_PER_VERTEX);
        self.indices.reserve(index_end);

        let color = color.to_array();
        let floats = &mut self.vertices.as_mut_slice()
            [base * FLOATS_PER_VERTEX..vertex_end * FLOATS_PER_VERTEX];
        for (dst, &p) in floats
            .chunks_exact_mut(FLOATS_PER_VERTEX)
            .zip(&geometry.positions)
        {
            dst[..3].copy_from_slice(&transform.transform_point3(p).to_array());
            dst[3..].copy_from_slice(&color);
        }

        let out = &mut self.indices.as_mut_slice()[index_start..index_end];
        let mut cursor = 0;
        expansion.for_each(&geometry.indices, |i| {
            out[cursor] = (base + i as usize) as u16;
            cursor += 1;
        });

        self.vertex_count = vertex_end;
        self.index_count = index_end;

        assert!(
            self.vertex_count * FLOATS_PER_VERTEX <= self.vertices.capacity()
                && self.index_count <= self.indices.capacity(),
            "batch `{}` wrote past its capacity",
            self.label
        );
        true
    }

    pub fn reset_logical_counts(&mut self) {
        self.vertex_count = 0;
        self.index_count = 0;
        self.dropped = 0;
    }

    /// Publishes this frame's logical contents to the GPU. An empty batch is
    /// reported inactive and nothing is uploaded.
    pub fn flush(&mut self, gpu: &mut dyn GpuBackend) -> FlushOutcome {
        if self.vertex_count == 0 {
            return FlushOutcome::Inactive;
        }

        let float_bytes = std::mem::size_of::<f32>();
        let mesh = match self.mesh {
            Some(mesh) => mesh,
            None => {
                let mesh = gpu.create_mesh(&MeshDesc {
                    label: self.label.clone(),
                    topology: self.topology,
                    vertex_bytes: self.vertices.capacity() * float_bytes,
                    index_count: self.indices.capacity(),
                });
                self.mesh = Some(mesh);
                mesh
            }
        };

        // Follow the CPU capacity so the GPU side grows as rarely as it does.
        let vertex_bytes = self.vertex_count * FLOATS_PER_VERTEX * float_bytes;
        if vertex_bytes > gpu.vertex_capacity(mesh) {
            gpu.resize_vertex_buffer(mesh, self.vertices.capacity() * float_bytes);
        }
        if self.index_count > gpu.index_capacity(mesh) {
            gpu.resize_index_buffer(mesh, self.indices.capacity());
        }

        let vertex_count = self.vertex_count as u32;
        gpu.upload(
            mesh,
            self.vertices.bytes(self.vertex_count * FLOATS_PER_VERTEX),
            &self.indices.as_slice()[..self.index_count],
            vertex_count,
        );

        FlushOutcome::Uploaded {
            vertex_count,
            index_count: self.index_count as u32,
        }
    }

    /// Releases the GPU mesh. The CPU buffers stay usable.
    pub fn destroy(&mut self, gpu: &mut dyn GpuBackend) {
        if let Some(mesh) = self.mesh.take() {
            gpu.destroy_mesh(mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle() -> Geometry {
        Geometry::triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2])
    }

    #[test]
    fn identity_append_keeps_positions() {
        let mut batch = MeshBatch::new("t", Topology::TriangleList, 8, 4);
        assert!(batch.append(&triangle(), IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE));
        let v = batch.vertices();
        assert_eq!(&v[7..10], &[1.0, 0.0, 0.0]);
        assert_eq!(&v[10..14], &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(batch.indices(), &[0, 1, 2]);
    }

    #[test]
    fn rotation_and_scale_are_applied() {
        let mut batch = MeshBatch::new("t", Topology::TriangleList, 64, 16);
        let m = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2) * Mat4::from_scale(Vec3::splat(2.0));
        batch.append(&triangle(), IndexExpansion::Direct, &m, Vec4::ONE);
        let x = Vec3::from_slice(&batch.vertices()[7..10]);
        assert!(x.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn second_append_is_rebased() {
        let mut batch = MeshBatch::new("t", Topology::TriangleList, 7, 1);
        batch.append(&triangle(), IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE);
        batch.append(&triangle(), IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE);
        assert_eq!(batch.indices(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(batch.vertex_count(), 6);
    }

    #[test]
    fn growth_doubles_from_initial_capacity() {
        let mut batch = MeshBatch::new("t", Topology::TriangleList, 7, 3);
        batch.append(&triangle(), IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE);
        // 21 floats needed from 7: 7 -> 14 -> 28.
        assert_eq!(batch.vertex_capacity(), 28);
        assert_eq!(batch.index_capacity(), 3);
    }

    #[test]
    fn overflowing_sixteen_bits_is_refused() {
        let positions = vec![Vec3::ZERO; MAX_BATCH_VERTICES];
        let big = Geometry::lines(positions, vec![0, 1]);
        let mut batch = MeshBatch::new("t", Topology::LineList, 7, 2);
        assert!(batch.append(&big, IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE));
        assert!(!batch.append(&triangle(), IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE));
        assert_eq!(batch.vertex_count(), MAX_BATCH_VERTICES);
    }

    #[test]
    fn full_batch_counts_drops_until_reset() {
        let positions = vec![Vec3::ZERO; MAX_BATCH_VERTICES - 1];
        let big = Geometry::lines(positions, vec![0, 1]);
        let mut batch = MeshBatch::new("t", Topology::LineList, 7, 2);
        assert!(batch.append(&big, IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE));
        for _ in 0..3 {
            assert!(!batch.append(&triangle(), IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE));
        }
        assert_eq!(batch.dropped(), 3);

        batch.reset_logical_counts();
        assert_eq!(batch.dropped(), 0);
        assert!(batch.append(&triangle(), IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE));
    }

    #[test]
    fn out_of_range_index_is_refused() {
        let bad = Geometry {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            indices: vec![0, 1, 7],
            topology: Topology::TriangleList,
            min: Vec3::ZERO,
            max: Vec3::ONE,
        };
        let mut batch = MeshBatch::new("t", Topology::TriangleList, 7, 3);
        assert!(batch.append(&triangle(), IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE));
        assert!(!batch.append(&bad, IndexExpansion::Direct, &Mat4::IDENTITY, Vec4::ONE));
        assert_eq!(batch.vertex_count(), 3);
        assert_eq!(batch.indices(), &[0, 1, 2]);
        assert_eq!(batch.dropped(), 1);
    }
}
