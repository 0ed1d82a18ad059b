use super::Geometry;
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Procedural shapes the drawer knows how to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveShape {
    Box,
    Sphere,
    Cylinder,
    Cone,
    Capsule,
    Torus,
    Quad,
    Plane,
}

/// Tessellation for the curved shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeParams {
    pub segments: u32,
    pub rings: u32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            segments: 32,
            rings: 16,
        }
    }
}

type Generator = fn(&ShapeParams) -> Geometry;

const SHAPES: [(PrimitiveShape, &str, Generator); 8] = [
    (PrimitiveShape::Box, "box", unit_box as Generator),
    (PrimitiveShape::Sphere, "sphere", sphere as Generator),
    (PrimitiveShape::Cylinder, "cylinder", cylinder as Generator),
    (PrimitiveShape::Cone, "cone", cone as Generator),
    (PrimitiveShape::Capsule, "capsule", capsule as Generator),
    (PrimitiveShape::Torus, "torus", torus as Generator),
    (PrimitiveShape::Quad, "quad", quad as Generator),
    (PrimitiveShape::Plane, "plane", plane as Generator),
];

impl PrimitiveShape {
    pub const ALL: [PrimitiveShape; 8] = [
        Self::Box,
        Self::Sphere,
        Self::Cylinder,
        Self::Cone,
        Self::Capsule,
        Self::Torus,
        Self::Quad,
        Self::Plane,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        SHAPES
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(shape, _, _)| *shape)
    }

    pub fn name(self) -> &'static str {
        SHAPES[self.table_index()].1
    }

    pub fn generate(self, params: &ShapeParams) -> Geometry {
        (SHAPES[self.table_index()].2)(params)
    }

    fn table_index(self) -> usize {
        self as usize
    }
}

/// Unit cube with 8 shared corners.
fn unit_box(_: &ShapeParams) -> Geometry {
    let positions = (0..8)
        .map(|i| {
            Vec3::new(
                if i & 1 == 0 { -0.5 } else { 0.5 },
                if i & 2 == 0 { -0.5 } else { 0.5 },
                if i & 4 == 0 { -0.5 } else { 0.5 },
            )
        })
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        4, 5, 7, 4, 7, 6, // +z
        1, 0, 2, 1, 2, 3, // -z
        5, 1, 3, 5, 3, 7, // +x
        0, 4, 6, 0, 6, 2, // -x
        6, 7, 3, 6, 3, 2, // +y
        0, 1, 5, 0, 5, 4, // -y
    ];

    Geometry::triangles(positions, indices)
}

fn sphere(params: &ShapeParams) -> Geometry {
    let radius = 1.0;
    let profile: Vec<(f32, f32)> = (0..=params.rings)
        .map(|ring| {
            let phi = PI * ring as f32 / params.rings as f32;
            (radius * phi.sin(), radius * phi.cos())
        })
        .collect();

    let mut positions = Vec::new();
    let mut indices = Vec::new();
    lathe(&profile, params.segments, &mut positions, &mut indices);
    Geometry::triangles(positions, indices)
}

fn cylinder(params: &ShapeParams) -> Geometry {
    let radius = 0.5;
    let half = 1.0;

    let mut positions = Vec::new();
    let mut indices = Vec::new();
    lathe(
        &[(radius, half), (radius, -half)],
        params.segments,
        &mut positions,
        &mut indices,
    );
    cap(half, radius, params.segments, true, &mut positions, &mut indices);
    cap(-half, radius, params.segments, false, &mut positions, &mut indices);
    Geometry::triangles(positions, indices)
}

fn cone(params: &ShapeParams) -> Geometry {
    let radius = 0.5;
    let half = 0.5;

    let mut positions = Vec::new();
    let mut indices = Vec::new();
    lathe(
        &[(0.0, half), (radius, -half)],
        params.segments,
        &mut positions,
        &mut indices,
    );
    cap(-half, radius, params.segments, false, &mut positions, &mut indices);
    Geometry::triangles(positions, indices)
}

fn capsule(params: &ShapeParams) -> Geometry {
    let radius = 0.5;
    let offset = 0.5; // half height minus radius
    let half_rings = (params.rings / 2).max(1);

    let top = (0..=half_rings).map(|i| {
        let phi = FRAC_PI_2 * i as f32 / half_rings as f32;
        (radius * phi.sin(), offset + radius * phi.cos())
    });
    let bottom = (0..=half_rings).map(|i| {
        let phi = FRAC_PI_2 + FRAC_PI_2 * i as f32 / half_rings as f32;
        (radius * phi.sin(), -offset + radius * phi.cos())
    });
    let profile: Vec<(f32, f32)> = top.chain(bottom).collect();

    let mut positions = Vec::new();
    let mut indices = Vec::new();
    lathe(&profile, params.segments, &mut positions, &mut indices);
    Geometry::triangles(positions, indices)
}

fn torus(params: &ShapeParams) -> Geometry {
    let radius = 0.4;
    let tube = 0.1;
    let radial = params.segments;
    let tubular = params.segments;

    let mut positions = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
    for i in 0..=radial {
        let u = TAU * i as f32 / radial as f32;
        for j in 0..=tubular {
            let v = TAU * j as f32 / tubular as f32;
            let ring = radius + tube * v.cos();
            positions.push(Vec3::new(ring * u.cos(), tube * v.sin(), ring * u.sin()));
        }
    }

    let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);
    for i in 0..radial {
        for j in 0..tubular {
            let a = i * (tubular + 1) + j;
            let b = a + tubular + 1;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }

    Geometry::triangles(positions, indices)
}

/// Unit quad in the XY plane facing +Z.
fn quad(_: &ShapeParams) -> Geometry {
    Geometry::triangles(
        vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

/// 10x10 grid in the XZ plane facing +Y.
fn plane(_: &ShapeParams) -> Geometry {
    let size = 10.0;
    let cells = 10u32;

    let mut positions = Vec::with_capacity(((cells + 1) * (cells + 1)) as usize);
    for iz in 0..=cells {
        let z = -size / 2.0 + size * iz as f32 / cells as f32;
        for ix in 0..=cells {
            let x = -size / 2.0 + size * ix as f32 / cells as f32;
            positions.push(Vec3::new(x, 0.0, z));
        }
    }

    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
    for iz in 0..cells {
        for ix in 0..cells {
            let a = iz * (cells + 1) + ix;
            let b = a + 1;
            let c = a + cells + 1;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    Geometry::triangles(positions, indices)
}

/// Revolves a top-to-bottom `(radius, y)` profile around the Y axis.
fn lathe(profile: &[(f32, f32)], segments: u32, positions: &mut Vec<Vec3>, indices: &mut Vec<u32>) {
    let base = positions.len() as u32;
    for &(radius, y) in profile {
        for segment in 0..=segments {
            let theta = TAU * segment as f32 / segments as f32;
            positions.push(Vec3::new(radius * theta.cos(), y, radius * theta.sin()));
        }
    }

    for ring in 0..profile.len().saturating_sub(1) as u32 {
        for segment in 0..segments {
            let current = base + ring * (segments + 1) + segment;
            let next = current + segments + 1;
            indices.extend_from_slice(&[current, current + 1, next, current + 1, next + 1, next]);
        }
    }
}

fn cap(
    y: f32,
    radius: f32,
    segments: u32,
    facing_up: bool,
    positions: &mut Vec<Vec3>,
    indices: &mut Vec<u32>,
) {
    let center = positions.len() as u32;
    positions.push(Vec3::new(0.0, y, 0.0));
    for segment in 0..=segments {
        let theta = TAU * segment as f32 / segments as f32;
        positions.push(Vec3::new(radius * theta.cos(), y, radius * theta.sin()));
    }

    for segment in 0..segments {
        let a = center + 1 + segment;
        let b = a + 1;
        if facing_up {
            indices.extend_from_slice(&[center, b, a]);
        } else {
            indices.extend_from_slice(&[center, a, b]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outward_facing(g: &Geometry, center: impl Fn(Vec3) -> Vec3) -> bool {
        g.indices.chunks(3).all(|tri| {
            let a = g.positions[tri[0] as usize];
            let b = g.positions[tri[1] as usize];
            let c = g.positions[tri[2] as usize];
            let normal = (b - a).cross(c - a);
            if normal.length_squared() < 1e-12 {
                return true; // degenerate pole triangle
            }
            let centroid = (a + b + c) / 3.0;
            normal.dot(centroid - center(centroid)) > 0.0
        })
    }

    #[test]
    fn box_uses_shared_corners() {
        let g = PrimitiveShape::Box.generate(&ShapeParams::default());
        assert_eq!(g.vertex_count(), 8);
        assert_eq!(g.index_count(), 36);
        assert!(outward_facing(&g, |_| Vec3::ZERO));
    }

    #[test]
    fn sphere_counts_follow_tessellation() {
        let params = ShapeParams {
            segments: 8,
            rings: 4,
        };
        let g = PrimitiveShape::Sphere.generate(&params);
        assert_eq!(g.vertex_count(), 9 * 5);
        assert_eq!(g.index_count(), 8 * 4 * 6);
        assert!(outward_facing(&g, |_| Vec3::ZERO));
    }

    #[test]
    fn closed_shapes_face_outward() {
        let params = ShapeParams::default();
        let cylinder = PrimitiveShape::Cylinder.generate(&params);
        assert!(outward_facing(&cylinder, |p| Vec3::new(0.0, p.y * 0.5, 0.0)));

        let capsule = PrimitiveShape::Capsule.generate(&params);
        assert!(outward_facing(&capsule, |p| Vec3::new(
            0.0,
            p.y.clamp(-0.5, 0.5),
            0.0
        )));

        let quad = PrimitiveShape::Quad.generate(&params);
        assert!(outward_facing(&quad, |p| p - Vec3::Z));

        let plane = PrimitiveShape::Plane.generate(&params);
        assert!(outward_facing(&plane, |p| p - Vec3::Y));
    }

    #[test]
    fn every_shape_has_valid_indices() {
        let params = ShapeParams::default();
        for shape in PrimitiveShape::ALL {
            let g = shape.generate(&params);
            assert!(!g.indices.is_empty(), "{} has no triangles", shape.name());
            assert_eq!(g.index_count() % 3, 0);
            assert!(g
                .indices
                .iter()
                .all(|&i| (i as usize) < g.vertex_count()));
        }
    }

    #[test]
    fn names_round_trip_through_table() {
        for shape in PrimitiveShape::ALL {
            assert_eq!(PrimitiveShape::from_name(shape.name()), Some(shape));
        }
        assert_eq!(PrimitiveShape::from_name("triangle"), None);
    }
}
