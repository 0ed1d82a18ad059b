pub mod components;
pub mod graph;
pub mod transform;
mod transforms;

pub use components::{
    Children, MeshRenderer, Name, NodeFlags, Parent, TransformComponent, Visible, WorldTransform,
};
pub use graph::{Renderable, SceneGraph};
pub use transform::Transform;
