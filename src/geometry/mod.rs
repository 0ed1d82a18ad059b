pub mod cache;
pub mod glyph;
pub mod primitives;
pub mod wireframe;

pub use cache::GeometryCache;
pub use glyph::{GlyphCache, GlyphSource};
pub use primitives::{PrimitiveShape, ShapeParams};
pub use wireframe::IndexExpansion;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How an index list is interpreted by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    TriangleList,
    LineList,
}

impl Topology {
    pub fn name(self) -> &'static str {
        match self {
            Self::TriangleList => "triangle-list",
            Self::LineList => "line-list",
        }
    }
}

/// Raw positions and indices produced by a shape generator or a glyph source.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub topology: Topology,
    pub min: Vec3,
    pub max: Vec3,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, topology: Topology) -> Self {
        let (min, max) = bounds(&positions);
        Self {
            positions,
            indices,
            topology,
            min,
            max,
        }
    }

    pub fn triangles(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self::new(positions, indices, Topology::TriangleList)
    }

    pub fn lines(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self::new(positions, indices, Topology::LineList)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether every index addresses one of this geometry's vertices.
    pub fn indices_in_range(&self) -> bool {
        let len = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < len)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
}

fn bounds(positions: &[Vec3]) -> (Vec3, Vec3) {
    if positions.is_empty() {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    positions.iter().fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_all_positions() {
        let g = Geometry::triangles(
            vec![
                Vec3::new(-1.0, 0.0, 2.0),
                Vec3::new(3.0, -2.0, 0.0),
                Vec3::new(0.0, 5.0, -1.0),
            ],
            vec![0, 1, 2],
        );
        assert_eq!(g.min, Vec3::new(-1.0, -2.0, -1.0));
        assert_eq!(g.max, Vec3::new(3.0, 5.0, 2.0));
        assert_eq!(g.width(), 4.0);
    }

    #[test]
    fn index_range_check_catches_stray_indices() {
        let mut g = Geometry::lines(vec![Vec3::ZERO, Vec3::X], vec![0, 1]);
        assert!(g.indices_in_range());
        g.indices.push(2);
        assert!(!g.indices_in_range());
    }

    #[test]
    fn empty_geometry_has_zero_bounds() {
        let g = Geometry::lines(Vec::new(), Vec::new());
        assert_eq!(g.width(), 0.0);
    }
}
