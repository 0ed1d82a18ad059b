// scene/components.rs
// Pure hecs components

use bitflags::bitflags;
use glam::Vec4;

use crate::renderer::gpu::{MaterialHandle, MeshHandle};
use crate::scene::Transform;

/// Local transform relative to the parent node
#[derive(Debug, Clone, Copy)]
pub struct TransformComponent(pub Transform);

/// World-space transform (computed from hierarchy)
#[derive(Debug, Clone, Copy)]
pub struct WorldTransform(pub Transform);

#[derive(Debug, Clone, Copy)]
pub struct Visible(pub bool);

impl Default for Visible {
    fn default() -> Self {
        Self(true)
    }
}

/// Name component, used for lookups
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

bitflags! {
    /// Editor/serialization hints carried by a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u32 {
        const DONT_SAVE = 1 << 0;
        const HIDE_IN_HIERARCHY = 1 << 1;
    }
}

/// Renderer attached to a node: a GPU mesh drawn with one material. `color`
/// feeds the instance-color path; vertex-colored materials ignore it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRenderer {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub color: Vec4,
}

// ============================================================================
// Hierarchy Components
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Parent(pub hecs::Entity);

#[derive(Debug, Clone, Default)]
pub struct Children(pub Vec<hecs::Entity>);
