pub mod drawer;

pub use drawer::DebugDrawer;

use serde::{Deserialize, Serialize};

/// How draws reach the GPU, fixed when the drawer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawStrategy {
    /// Draws sharing a render state are packed into one dynamic mesh.
    #[default]
    Batched,
    /// One pooled renderer node per draw over a shared static mesh.
    Instanced,
}

impl DrawStrategy {
    pub fn use_vertex_color(self) -> bool {
        matches!(self, Self::Batched)
    }
}
