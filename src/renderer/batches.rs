// renderer/batches.rs
//! Batched strategy: every draw sharing a render state key lands in one
//! vertex-colored `MeshBatch`, drawn with a single submission.

use std::collections::HashMap;

use glam::Vec4;
use hecs::Entity;

use super::batch::{FlushOutcome, MeshBatch};
use super::material::MaterialCache;
use super::state::RenderStateKey;
use super::target::{BatchStats, DrawRequest, DrawTarget};
use crate::frame::FrameContext;
use crate::scene::{MeshRenderer, NodeFlags};

struct BatchSlot {
    batch: MeshBatch,
    node: Option<Entity>,
    active: bool,
}

pub struct BatchedTarget {
    slots: HashMap<RenderStateKey, BatchSlot>,
    initial_vertex_floats: usize,
    initial_indices: usize,
}

impl BatchedTarget {
    pub fn new(initial_vertex_floats: usize, initial_indices: usize) -> Self {
        Self {
            slots: HashMap::new(),
            initial_vertex_floats,
            initial_indices,
        }
    }

    pub fn batch(&self, key: &RenderStateKey) -> Option<&MeshBatch> {
        self.slots.get(key).map(|slot| &slot.batch)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl DrawTarget for BatchedTarget {
    fn append(&mut self, request: &DrawRequest<'_>) -> bool {
        let (floats, indices) = (self.initial_vertex_floats, self.initial_indices);
        let slot = self.slots.entry(request.key).or_insert_with(|| {
            log::debug!("New debug batch `{}`", request.key);
            BatchSlot {
                batch: MeshBatch::new(request.key.id(), request.key.topology, floats, indices),
                node: None,
                active: false,
            }
        });
        slot.batch.append(
            request.geometry,
            request.expansion,
            &request.transform,
            request.color,
        )
    }

    fn reset(&mut self, _ctx: &mut FrameContext<'_>) {
        for slot in self.slots.values_mut() {
            slot.batch.reset_logical_counts();
        }
    }

    fn finish(&mut self, ctx: &mut FrameContext<'_>, root: Entity, materials: &mut MaterialCache) {
        for (key, slot) in self.slots.iter_mut() {
            slot.active = false;

            let material = if slot.batch.vertex_count() > 0 {
                materials.resolve(&mut *ctx.gpu, key)
            } else {
                None
            };
            let Some(material) = material else {
                if let Some(node) = slot.node {
                    ctx.scene.set_visible(node, false);
                }
                continue;
            };

            match slot.batch.flush(&mut *ctx.gpu) {
                FlushOutcome::Inactive => {
                    if let Some(node) = slot.node {
                        ctx.scene.set_visible(node, false);
                    }
                }
                FlushOutcome::Uploaded { .. } => {
                    let Some(mesh) = slot.batch.mesh() else {
                        continue;
                    };
                    let node = match slot.node.filter(|n| ctx.scene.is_alive(*n)) {
                        Some(node) => node,
                        None => {
                            let node = ctx.scene.create_node(slot.batch.label(), Some(root));
                            ctx.scene.set_flags(
                                node,
                                NodeFlags::DONT_SAVE | NodeFlags::HIDE_IN_HIERARCHY,
                            );
                            ctx.scene.attach_renderer(
                                node,
                                MeshRenderer {
                                    mesh,
                                    material,
                                    color: Vec4::ONE,
                                },
                            );
                            slot.node = Some(node);
                            node
                        }
                    };
                    ctx.scene.set_visible(node, true);
                    slot.active = true;
                }
            }
        }
    }

    fn destroy(&mut self, ctx: &mut FrameContext<'_>) {
        for (_, mut slot) in self.slots.drain() {
            slot.batch.destroy(&mut *ctx.gpu);
            if let Some(node) = slot.node {
                ctx.scene.destroy_node(node);
            }
        }
    }

    fn stats(&self) -> Vec<BatchStats> {
        self.slots
            .iter()
            .map(|(key, slot)| BatchStats {
                key: *key,
                geometry: None,
                vertex_count: slot.batch.vertex_count(),
                index_count: slot.batch.index_count(),
                instances: usize::from(slot.active),
                active: slot.active,
            })
            .collect()
    }
}
