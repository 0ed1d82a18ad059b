mod common;

use common::{settings, Harness, SOLID_KEY};
use debug_draw::renderer::GeometryId;
use debug_draw::{DrawStrategy, PrimitiveShape};
use glam::{Mat4, Vec3, Vec4};

fn instanced() -> Harness {
    Harness::new(settings(DrawStrategy::Instanced))
}

fn draw_boxes(h: &mut Harness, count: usize) {
    h.frame(|d| {
        for i in 0..count {
            d.set_matrix(Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)));
            d.set_color(Vec4::new(i as f32 / 4.0, 0.0, 0.0, 1.0));
            d.draw_box();
        }
    });
}

#[test]
fn repeated_shape_shares_one_mesh() {
    let mut h = instanced();
    draw_boxes(&mut h, 3);

    let stats = h.drawer().stats();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].key.id(), SOLID_KEY);
    assert_eq!(stats[0].geometry, Some(GeometryId::Shape(PrimitiveShape::Box)));
    assert_eq!(stats[0].instances, 3);
    assert_eq!((stats[0].vertex_count, stats[0].index_count), (8, 36));
    assert!(stats[0].active);

    assert_eq!(h.gpu.mesh_count(), 1);
    let renderers = h.visible_renderers();
    assert_eq!(renderers.len(), 3);
    assert!(renderers.iter().all(|r| r.mesh == renderers[0].mesh));
}

#[test]
fn instances_carry_their_own_transform_and_color() {
    let mut h = instanced();
    draw_boxes(&mut h, 2);

    let mut renderables = h.scene.renderables();
    renderables.sort_by(|a, b| a.model.w_axis.x.total_cmp(&b.model.w_axis.x));
    assert_eq!(renderables.len(), 2);
    assert_eq!(renderables[0].model.w_axis.truncate(), Vec3::ZERO);
    assert_eq!(renderables[1].model.w_axis.truncate(), Vec3::X);
    assert_eq!(renderables[1].renderer.color, Vec4::new(0.25, 0.0, 0.0, 1.0));

    let material = h.gpu.material(renderables[0].renderer.material).unwrap();
    assert!(!material.use_vertex_color);
}

#[test]
fn pooled_nodes_are_reused_and_hidden() {
    let mut h = instanced();
    draw_boxes(&mut h, 3);
    let root = h.drawer().root();
    assert_eq!(h.scene.children(root).len(), 3);
    h.gpu.reset_stats();

    draw_boxes(&mut h, 1);

    assert_eq!(h.scene.children(root).len(), 3);
    assert_eq!(h.visible_renderers().len(), 1);
    assert_eq!(h.gpu.mesh_count(), 1);
    assert_eq!(h.gpu.stats().vertex_writes, 0);

    draw_boxes(&mut h, 4);
    assert_eq!(h.scene.children(root).len(), 4);
    assert_eq!(h.visible_renderers().len(), 4);
}

#[test]
fn empty_frame_hides_every_instance() {
    let mut h = instanced();
    draw_boxes(&mut h, 2);
    h.frame(|_| {});

    assert!(h.visible_renderers().is_empty());
    assert!(h.drawer().stats().iter().all(|s| !s.active));
}

#[test]
fn distinct_geometry_gets_distinct_slots() {
    let mut h = instanced();
    h.frame(|d| {
        d.draw_box();
        d.sphere();
        d.line(&[[Vec3::ZERO, Vec3::X]]);
        d.line(&[[Vec3::ZERO, Vec3::Y]]);
    });

    assert_eq!(h.drawer().stats().len(), 4);
    assert_eq!(h.gpu.mesh_count(), 4);
}

#[test]
fn moving_lines_do_not_accumulate_meshes() {
    let mut h = instanced();
    for f in 0..50 {
        h.frame(|d| d.line(&[[Vec3::ZERO, Vec3::new(f as f32 * 0.1, 1.0, 0.0)]]));
    }

    assert_eq!(h.gpu.mesh_count(), 1);
    assert_eq!(h.drawer().stats().len(), 1);
    let root = h.drawer().root();
    assert_eq!(h.scene.children(root).len(), 1);
    assert_eq!(h.visible_renderers().len(), 1);
}

#[test]
fn repeated_line_keeps_its_mesh() {
    let mut h = instanced();
    let segment = [[Vec3::ZERO, Vec3::Y]];
    h.frame(|d| d.line(&segment));
    h.gpu.reset_stats();

    h.frame(|d| d.line(&segment));

    assert_eq!(h.gpu.mesh_count(), 1);
    assert_eq!(h.gpu.stats().vertex_writes, 0);
    assert_eq!(h.visible_renderers().len(), 1);
}

#[test]
fn idle_shapes_keep_their_slot() {
    let mut h = instanced();
    draw_boxes(&mut h, 1);
    h.frame(|_| {});

    assert_eq!(h.gpu.mesh_count(), 1);
    assert!(h.visible_renderers().is_empty());
}
