use glam::{Mat4, Vec4};
use hecs::{Entity, World};

use super::components::{
    Children, MeshRenderer, Name, NodeFlags, Parent, TransformComponent, Visible, WorldTransform,
};
use super::transform::Transform;
use super::transforms::propagate_transforms;

/// A visible renderer node ready to be drawn.
#[derive(Debug, Clone, Copy)]
pub struct Renderable {
    pub entity: Entity,
    pub renderer: MeshRenderer,
    pub model: Mat4,
}

/// Node hierarchy the drawer hangs its renderer nodes from.
pub struct SceneGraph {
    world: World,
    active: Option<Entity>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            active: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Creates a scene root and makes it the active scene, replacing any
    /// previous one.
    pub fn load_scene(&mut self, name: &str) -> Entity {
        self.unload_scene();
        let root = self.create_node(name, None);
        self.active = Some(root);
        log::info!("Loaded scene `{}`", name);
        root
    }

    pub fn unload_scene(&mut self) {
        if let Some(root) = self.active.take() {
            self.destroy_node(root);
        }
    }

    pub fn active_scene(&self) -> Option<Entity> {
        self.active.filter(|root| self.world.contains(*root))
    }

    pub fn create_node(&mut self, name: &str, parent: Option<Entity>) -> Entity {
        let entity = self.world.spawn((
            Name::new(name),
            TransformComponent(Transform::IDENTITY),
            Visible::default(),
            NodeFlags::empty(),
        ));

        if let Some(parent) = parent.filter(|p| self.world.contains(*p)) {
            self.world.insert_one(entity, Parent(parent)).ok();
            let pushed = match self.world.get::<&mut Children>(parent) {
                Ok(mut children) => {
                    children.0.push(entity);
                    true
                }
                Err(_) => false,
            };
            if !pushed {
                self.world.insert_one(parent, Children(vec![entity])).ok();
            }
        }

        entity
    }

    /// Despawns `entity` and its whole subtree. Returns false if it was
    /// already gone.
    pub fn destroy_node(&mut self, entity: Entity) -> bool {
        if !self.world.contains(entity) {
            return false;
        }

        let parent = self.world.get::<&Parent>(entity).map(|p| p.0).ok();
        if let Some(parent) = parent {
            if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
                children.0.retain(|c| *c != entity);
            }
        }

        let mut stack = vec![entity];
        while let Some(node) = stack.pop() {
            if let Ok(children) = self.world.get::<&Children>(node) {
                stack.extend(children.0.iter().copied());
            }
            self.world.despawn(node).ok();
        }

        if self.active == Some(entity) {
            self.active = None;
        }
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.world
            .query::<&Name>()
            .iter()
            .find(|(_, n)| n.0 == name)
            .map(|(entity, _)| entity)
    }

    pub fn children(&self, entity: Entity) -> Vec<Entity> {
        self.world
            .get::<&Children>(entity)
            .map(|c| c.0.clone())
            .unwrap_or_default()
    }

    pub fn set_flags(&mut self, entity: Entity, flags: NodeFlags) {
        if let Ok(mut current) = self.world.get::<&mut NodeFlags>(entity) {
            *current = flags;
        }
    }

    pub fn flags(&self, entity: Entity) -> NodeFlags {
        self.world
            .get::<&NodeFlags>(entity)
            .map(|f| *f)
            .unwrap_or_default()
    }

    pub fn set_visible(&mut self, entity: Entity, visible: bool) {
        if let Ok(mut v) = self.world.get::<&mut Visible>(entity) {
            v.0 = visible;
        }
    }

    /// Own flag only; ancestors are not consulted.
    pub fn is_visible(&self, entity: Entity) -> bool {
        self.world
            .get::<&Visible>(entity)
            .map(|v| v.0)
            .unwrap_or(false)
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform) {
        if let Ok(mut t) = self.world.get::<&mut TransformComponent>(entity) {
            t.0 = transform;
        }
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.world.get::<&TransformComponent>(entity).map(|t| t.0).ok()
    }

    pub fn attach_renderer(&mut self, entity: Entity, renderer: MeshRenderer) {
        if let Err(e) = self.world.insert_one(entity, renderer) {
            log::error!("Failed to attach renderer to node {:?}: {:?}", entity, e);
        }
    }

    pub fn renderer(&self, entity: Entity) -> Option<MeshRenderer> {
        self.world.get::<&MeshRenderer>(entity).map(|r| *r).ok()
    }

    pub fn set_renderer_color(&mut self, entity: Entity, color: Vec4) {
        if let Ok(mut r) = self.world.get::<&mut MeshRenderer>(entity) {
            r.color = color;
        }
    }

    pub fn update_world_transforms(&mut self) {
        propagate_transforms(&mut self.world);
    }

    /// Renderer nodes that are visible along their whole ancestor chain.
    pub fn renderables(&mut self) -> Vec<Renderable> {
        self.update_world_transforms();

        let candidates: Vec<Renderable> = self
            .world
            .query::<(&MeshRenderer, &WorldTransform)>()
            .iter()
            .map(|(entity, (renderer, world))| Renderable {
                entity,
                renderer: *renderer,
                model: world.0.matrix(),
            })
            .collect();

        candidates
            .into_iter()
            .filter(|r| self.visible_in_hierarchy(r.entity))
            .collect()
    }

    fn visible_in_hierarchy(&self, entity: Entity) -> bool {
        let mut current = Some(entity);
        while let Some(node) = current {
            if !self.is_visible(node) {
                return false;
            }
            current = self.world.get::<&Parent>(node).map(|p| p.0).ok();
        }
        true
    }
}
