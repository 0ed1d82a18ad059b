// renderer/instance.rs
//! Instanced strategy: one static GPU mesh per (state key, geometry) and a
//! pool of renderer nodes, one per draw, reused across frames.

use std::collections::HashMap;

use glam::{Mat4, Vec3, Vec4};
use hecs::Entity;

use super::batch::MAX_BATCH_VERTICES;
use super::gpu::{MeshDesc, MeshHandle};
use super::material::MaterialCache;
use super::state::RenderStateKey;
use super::target::{BatchStats, DrawRequest, DrawTarget, GeometryId};
use super::vertex::{v, DebugVertex};
use crate::frame::FrameContext;
use crate::geometry::IndexExpansion;
use crate::scene::{MeshRenderer, NodeFlags, Transform};

type SlotKey = (RenderStateKey, GeometryId, IndexExpansion);

struct InstanceSlot {
    vertices: Vec<DebugVertex>,
    indices: Vec<u16>,
    mesh: Option<MeshHandle>,
    nodes: Vec<Entity>,
    instances: Vec<(Mat4, Vec4)>,
}

impl InstanceSlot {
    fn hide_all(&self, ctx: &mut FrameContext<'_>) {
        for &node in &self.nodes {
            ctx.scene.set_visible(node, false);
        }
    }

    /// Destroys the GPU mesh and every pooled node.
    fn release(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(mesh) = self.mesh.take() {
            ctx.gpu.destroy_mesh(mesh);
        }
        for node in self.nodes.drain(..) {
            ctx.scene.destroy_node(node);
        }
    }
}

#[derive(Default)]
pub struct InstancePool {
    slots: HashMap<SlotKey, InstanceSlot>,
}

impl InstancePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total pooled nodes, used or not.
    pub fn pooled_nodes(&self) -> usize {
        self.slots.values().map(|slot| slot.nodes.len()).sum()
    }
}

impl DrawTarget for InstancePool {
    fn append(&mut self, request: &DrawRequest<'_>) -> bool {
        let slot_key = (request.key, request.geometry_id, request.expansion);
        if !self.slots.contains_key(&slot_key) {
            let geometry = request.geometry;
            if !geometry.indices_in_range() {
                log::warn!("Geometry indexes past its vertices; dropping it");
                return false;
            }
            if geometry.vertex_count() > MAX_BATCH_VERTICES {
                log::warn!(
                    "Geometry with {} vertices cannot be instanced; dropping it",
                    geometry.vertex_count()
                );
                return false;
            }
            // Instance color comes from the node; vertex color stays white.
            let vertices = geometry
                .positions
                .iter()
                .map(|&p: &Vec3| v(p, Vec4::ONE))
                .collect();
            let indices = request
                .expansion
                .expand(&geometry.indices)
                .into_iter()
                .map(|i| i as u16)
                .collect();
            self.slots.insert(
                slot_key,
                InstanceSlot {
                    vertices,
                    indices,
                    mesh: None,
                    nodes: Vec::new(),
                    instances: Vec::new(),
                },
            );
        }

        if let Some(slot) = self.slots.get_mut(&slot_key) {
            slot.instances.push((request.transform, request.color));
        }
        true
    }

    fn reset(&mut self, ctx: &mut FrameContext<'_>) {
        for slot in self.slots.values_mut() {
            slot.instances.clear();
            slot.hide_all(ctx);
        }
    }

    fn finish(&mut self, ctx: &mut FrameContext<'_>, root: Entity, materials: &mut MaterialCache) {
        // Ad-hoc line slots are released by the first frame that leaves them unused.
        self.slots.retain(|(_, geometry_id, _), slot| {
            let keep =
                !slot.instances.is_empty() || !matches!(geometry_id, GeometryId::Adhoc(_));
            if !keep {
                slot.release(ctx);
            }
            keep
        });

        for ((key, geometry_id, _), slot) in self.slots.iter_mut() {
            slot.nodes.retain(|node| ctx.scene.is_alive(*node));

            if slot.instances.is_empty() {
                slot.hide_all(ctx);
                continue;
            }

            let Some(material) = materials.resolve(&mut *ctx.gpu, key) else {
                slot.hide_all(ctx);
                continue;
            };

            let mesh = match slot.mesh {
                Some(mesh) => mesh,
                None => {
                    let vertex_bytes: &[u8] = bytemuck::cast_slice(&slot.vertices);
                    let mesh = ctx.gpu.create_mesh(&MeshDesc {
                        label: format!("{}_{:?}", key, geometry_id),
                        topology: key.topology,
                        vertex_bytes: vertex_bytes.len(),
                        index_count: slot.indices.len(),
                    });
                    ctx.gpu.upload(
                        mesh,
                        vertex_bytes,
                        &slot.indices,
                        slot.vertices.len() as u32,
                    );
                    slot.mesh = Some(mesh);
                    mesh
                }
            };

            while slot.nodes.len() < slot.instances.len() {
                let node = ctx
                    .scene
                    .create_node(&format!("{}_{}", key, slot.nodes.len()), Some(root));
                ctx.scene
                    .set_flags(node, NodeFlags::DONT_SAVE | NodeFlags::HIDE_IN_HIERARCHY);
                ctx.scene.attach_renderer(
                    node,
                    MeshRenderer {
                        mesh,
                        material,
                        color: Vec4::ONE,
                    },
                );
                slot.nodes.push(node);
            }

            for (i, &node) in slot.nodes.iter().enumerate() {
                match slot.instances.get(i) {
                    Some(&(transform, color)) => {
                        ctx.scene.set_transform(node, Transform::from_matrix(transform));
                        ctx.scene.set_renderer_color(node, color);
                        ctx.scene.set_visible(node, true);
                    }
                    None => ctx.scene.set_visible(node, false),
                }
            }
        }
    }

    fn destroy(&mut self, ctx: &mut FrameContext<'_>) {
        for (_, mut slot) in self.slots.drain() {
            slot.release(ctx);
        }
    }

    fn stats(&self) -> Vec<BatchStats> {
        self.slots
            .iter()
            .map(|((key, geometry_id, _), slot)| BatchStats {
                key: *key,
                geometry: Some(*geometry_id),
                vertex_count: slot.vertices.len(),
                index_count: slot.indices.len(),
                instances: slot.instances.len(),
                active: !slot.instances.is_empty() && slot.mesh.is_some(),
            })
            .collect()
    }
}
