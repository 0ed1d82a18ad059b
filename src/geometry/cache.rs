use std::collections::HashMap;
use std::sync::Arc;

use super::primitives::{PrimitiveShape, ShapeParams};
use super::wireframe;
use super::Geometry;

/// Per-shape geometry cache. Generation only depends on the shape and the
/// tessellation parameters, so each shape is built at most once.
pub struct GeometryCache {
    params: ShapeParams,
    shapes: HashMap<PrimitiveShape, Arc<Geometry>>,
    outlines: HashMap<PrimitiveShape, Arc<Geometry>>,
}

impl GeometryCache {
    pub fn new(params: ShapeParams) -> Self {
        Self {
            params,
            shapes: HashMap::new(),
            outlines: HashMap::new(),
        }
    }

    pub fn params(&self) -> ShapeParams {
        self.params
    }

    /// Resolves a shape by name, substituting a box for unknown names.
    pub fn resolve(name: &str) -> PrimitiveShape {
        PrimitiveShape::from_name(name).unwrap_or_else(|| {
            log::warn!("Unknown primitive `{}`; drawing a box instead", name);
            PrimitiveShape::Box
        })
    }

    pub fn shape(&mut self, shape: PrimitiveShape) -> Arc<Geometry> {
        let params = self.params;
        Arc::clone(
            self.shapes
                .entry(shape)
                .or_insert_with(|| Arc::new(shape.generate(&params))),
        )
    }

    /// Hand-authored edge loops, for shapes that have them.
    pub fn outline(&mut self, shape: PrimitiveShape) -> Option<Arc<Geometry>> {
        let build = match shape {
            PrimitiveShape::Box => wireframe::box_outline,
            PrimitiveShape::Quad => wireframe::quad_outline,
            _ => return None,
        };
        Some(Arc::clone(
            self.outlines
                .entry(shape)
                .or_insert_with(|| Arc::new(build())),
        ))
    }

    pub fn len(&self) -> usize {
        self.shapes.len() + self.outlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(ShapeParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_are_generated_once() {
        let mut cache = GeometryCache::default();
        let a = cache.shape(PrimitiveShape::Sphere);
        let b = cache.shape(PrimitiveShape::Sphere);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn only_box_and_quad_have_outlines() {
        let mut cache = GeometryCache::default();
        assert_eq!(
            cache.outline(PrimitiveShape::Box).map(|g| g.index_count()),
            Some(24)
        );
        assert_eq!(
            cache.outline(PrimitiveShape::Quad).map(|g| g.index_count()),
            Some(8)
        );
        assert!(cache.outline(PrimitiveShape::Sphere).is_none());
    }

    #[test]
    fn unknown_names_fall_back_to_box() {
        assert_eq!(GeometryCache::resolve("triangle"), PrimitiveShape::Box);
        assert_eq!(GeometryCache::resolve("torus"), PrimitiveShape::Torus);
    }
}
