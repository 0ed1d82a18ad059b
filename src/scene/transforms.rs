use hecs::{Entity, World};

use crate::scene::components::{Children, Parent, TransformComponent, WorldTransform};
use crate::scene::transform::Transform;

/// Recomputes `WorldTransform` for every node reachable from a root. World
/// matrices are resolved first and written back in one pass.
pub(crate) fn propagate_transforms(world: &mut World) {
    let mut frontier: Vec<(Entity, Transform)> = world
        .query::<&TransformComponent>()
        .without::<&Parent>()
        .iter()
        .map(|(entity, local)| (entity, local.0))
        .collect();
    let mut resolved = Vec::with_capacity(frontier.len());

    while let Some((entity, world_transform)) = frontier.pop() {
        if let Ok(children) = world.get::<&Children>(entity) {
            for &child in &children.0 {
                if let Ok(local) = world.get::<&TransformComponent>(child) {
                    frontier.push((child, world_transform.mul_transform(&local.0)));
                }
            }
        }
        resolved.push((entity, world_transform));
    }

    for (entity, transform) in resolved {
        if world.insert_one(entity, WorldTransform(transform)).is_err() {
            log::warn!("Node {:?} vanished during transform propagation", entity);
        }
    }
}
