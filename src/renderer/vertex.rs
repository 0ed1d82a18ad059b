use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use std::mem;

/// Floats per packed vertex: position (3) + color (4).
pub const FLOATS_PER_VERTEX: usize = 7;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct DebugVertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

impl DebugVertex {
    pub const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x4
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<DebugVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.pos)
    }
}

#[inline]
pub fn v(pos: Vec3, color: Vec4) -> DebugVertex {
    DebugVertex {
        pos: pos.to_array(),
        color: color.to_array(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_seven_floats() {
        assert_eq!(
            mem::size_of::<DebugVertex>(),
            FLOATS_PER_VERTEX * mem::size_of::<f32>()
        );
        assert_eq!(
            DebugVertex::layout().array_stride,
            mem::size_of::<DebugVertex>() as wgpu::BufferAddress
        );
    }
}
