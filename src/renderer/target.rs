// renderer/target.rs
//! The contract both drawing strategies implement.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::{Mat4, Vec4};
use hecs::Entity;

use super::material::MaterialCache;
use super::state::RenderStateKey;
use crate::frame::FrameContext;
use crate::geometry::{Geometry, IndexExpansion, PrimitiveShape};

/// Which geometry a draw used. Instancing keeps one GPU mesh per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryId {
    Shape(PrimitiveShape),
    Outline(PrimitiveShape),
    Glyph { ch: char, scale_bits: u32 },
    /// Caller-built lines, identified by content.
    Adhoc(u64),
}

impl GeometryId {
    pub fn adhoc(geometry: &Geometry) -> Self {
        let mut hasher = DefaultHasher::new();
        for p in &geometry.positions {
            p.to_array().map(f32::to_bits).hash(&mut hasher);
        }
        geometry.indices.hash(&mut hasher);
        Self::Adhoc(hasher.finish())
    }
}

pub struct DrawRequest<'a> {
    pub geometry: &'a Geometry,
    pub geometry_id: GeometryId,
    pub expansion: IndexExpansion,
    pub transform: Mat4,
    pub color: Vec4,
    pub key: RenderStateKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    pub key: RenderStateKey,
    /// Only set by the instanced strategy.
    pub geometry: Option<GeometryId>,
    pub vertex_count: usize,
    pub index_count: usize,
    pub instances: usize,
    pub active: bool,
}

pub trait DrawTarget {
    /// Records one draw. Returns false if it was dropped.
    fn append(&mut self, request: &DrawRequest<'_>) -> bool;

    /// Starts a new frame: logical counts go to zero, pooled nodes are hidden.
    fn reset(&mut self, ctx: &mut FrameContext<'_>);

    /// Publishes the frame under `root`.
    fn finish(&mut self, ctx: &mut FrameContext<'_>, root: Entity, materials: &mut MaterialCache);

    /// Frees every GPU mesh and node this target created.
    fn destroy(&mut self, ctx: &mut FrameContext<'_>);

    fn stats(&self) -> Vec<BatchStats>;
}
