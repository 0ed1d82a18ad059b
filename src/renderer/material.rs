// renderer/material.rs
use std::collections::HashMap;

use super::gpu::{GpuBackend, MaterialDesc, MaterialHandle};
use super::state::RenderStateKey;
use crate::asset::EffectRequest;

/// Lazily built materials, one per render state key, all made from the same
/// unlit effect. Keys whose effect has not arrived yet resolve to `None`.
pub struct MaterialCache {
    effect: EffectRequest,
    use_vertex_color: bool,
    materials: HashMap<RenderStateKey, MaterialHandle>,
}

impl MaterialCache {
    pub fn new(effect: EffectRequest, use_vertex_color: bool) -> Self {
        Self {
            effect,
            use_vertex_color,
            materials: HashMap::new(),
        }
    }

    pub fn effect_ready(&self) -> bool {
        self.effect.is_ready()
    }

    pub fn get(&self, key: &RenderStateKey) -> Option<MaterialHandle> {
        self.materials.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn resolve(
        &mut self,
        gpu: &mut dyn GpuBackend,
        key: &RenderStateKey,
    ) -> Option<MaterialHandle> {
        if let Some(material) = self.get(key) {
            return Some(material);
        }

        let Some(effect) = self.effect.poll() else {
            log::debug!(
                "Effect `{}` not available; skipping `{}` this frame",
                self.effect.id(),
                key
            );
            return None;
        };

        let wanted = key.technique.name();
        let technique_index = effect.technique_index(wanted).unwrap_or_else(|| {
            log::warn!(
                "Effect `{}` has no technique `{}`; using technique 0",
                effect.id,
                wanted
            );
            0
        });
        let technique = effect
            .techniques
            .get(technique_index)
            .cloned()
            .unwrap_or_else(|| wanted.to_string());

        let desc = MaterialDesc {
            label: format!("debug_draw_{}", key),
            effect_id: effect.id.clone(),
            technique,
            technique_index,
            topology: key.topology,
            cull: key.cull,
            depth: key.depth,
            alpha_blend: key.technique.uses_alpha_blending(),
            use_vertex_color: self.use_vertex_color,
        };
        let material = gpu.create_material(&desc);
        log::debug!("Created material `{}`", desc.label);

        self.materials.insert(*key, material);
        Some(material)
    }

    pub fn destroy(&mut self, gpu: &mut dyn GpuBackend) {
        for (_, material) in self.materials.drain() {
            gpu.destroy_material(material);
        }
    }
}
