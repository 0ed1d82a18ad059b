//! Line-list derivation: authored outline loops, open polylines and the generic
//! per-triangle edge expansion.

use super::Geometry;
use glam::Vec3;

/// Rule for turning a geometry's index list into the indices that get appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexExpansion {
    /// Copied 1:1: triangle lists and already-paired line lists.
    Direct,
    /// Each adjacent pair of the sequence becomes one segment. No closing segment.
    Strip,
    /// Each triangle (a, b, c) becomes (a, b), (b, c), (c, a). Shared edges are
    /// emitted once per triangle that owns them.
    TriangleEdges,
}

impl IndexExpansion {
    pub fn expanded_len(self, source_len: usize) -> usize {
        match self {
            Self::Direct => source_len,
            Self::Strip => source_len.saturating_sub(1) * 2,
            Self::TriangleEdges => source_len / 3 * 6,
        }
    }

    pub fn for_each(self, indices: &[u32], mut emit: impl FnMut(u32)) {
        match self {
            Self::Direct => indices.iter().copied().for_each(emit),
            Self::Strip => {
                for pair in indices.windows(2) {
                    emit(pair[0]);
                    emit(pair[1]);
                }
            }
            Self::TriangleEdges => {
                for tri in indices.chunks_exact(3) {
                    let (a, b, c) = (tri[0], tri[1], tri[2]);
                    emit(a);
                    emit(b);
                    emit(b);
                    emit(c);
                    emit(c);
                    emit(a);
                }
            }
        }
    }

    pub fn expand(self, indices: &[u32]) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.expanded_len(indices.len()));
        self.for_each(indices, |i| out.push(i));
        out
    }
}

/// Builds a line list from point groups. Groups of three or more points are
/// closed back to their first point, a two-point group is a single segment.
pub fn line_loops<G: AsRef<[Vec3]>>(groups: &[G]) -> Geometry {
    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for group in groups {
        let points = group.as_ref();
        let start = positions.len() as u32;
        positions.extend_from_slice(points);

        match points.len() {
            0 | 1 => {}
            2 => indices.extend_from_slice(&[start, start + 1]),
            n => {
                for i in 0..n as u32 {
                    let next = if i + 1 < n as u32 { i + 1 } else { 0 };
                    indices.extend_from_slice(&[start + i, start + next]);
                }
            }
        }
    }

    Geometry::lines(positions, indices)
}

/// Open polyline whose index list is the plain point sequence; pair it with
/// [`IndexExpansion::Strip`].
pub fn polyline(points: &[Vec3]) -> Geometry {
    Geometry::lines(points.to_vec(), (0..points.len() as u32).collect())
}

/// Twelve box edges as two 4-point loops plus four connecting segments.
pub fn box_outline() -> Geometry {
    let (w, h, l) = (0.5, 0.5, 0.5);
    let front = [
        Vec3::new(-w, -h, l),
        Vec3::new(w, -h, l),
        Vec3::new(w, h, l),
        Vec3::new(-w, h, l),
    ];
    let back = front.map(|p| Vec3::new(p.x, p.y, -l));

    let mut groups: Vec<Vec<Vec3>> = vec![front.to_vec(), back.to_vec()];
    groups.extend((0..4).map(|i| vec![front[i], back[i]]));
    line_loops(groups.as_slice())
}

/// Single 4-point loop around the unit quad.
pub fn quad_outline() -> Geometry {
    line_loops(&[[
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(0.5, -0.5, 0.0),
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(-0.5, 0.5, 0.0),
    ]])
}
