mod common;

use common::{assert_position, settings, Harness, HIDDEN_LINE_KEY, LINE_KEY, SOLID_KEY};
use debug_draw::geometry::GlyphSource;
use debug_draw::{CompareFunc, CullMode, DrawStrategy, DrawType, Geometry, Technique};
use glam::{Mat4, Vec3, Vec4};

const GLYPH_KEY: &str = "transparent_none_unset_unset_unset_triangle-list";

/// Unit-wide square per visible character.
struct SquareGlyphs;

impl GlyphSource for SquareGlyphs {
    fn glyph(&mut self, ch: char, scale: f32) -> Option<Geometry> {
        if ch == ' ' {
            return None;
        }
        let s = 0.5 * scale;
        Some(Geometry::triangles(
            vec![
                Vec3::new(-s, -s, 0.0),
                Vec3::new(s, -s, 0.0),
                Vec3::new(s, s, 0.0),
                Vec3::new(-s, s, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        ))
    }
}

/// Emits a triangle whose last index points past its vertices for `x`.
struct StrayIndexGlyphs;

impl GlyphSource for StrayIndexGlyphs {
    fn glyph(&mut self, ch: char, scale: f32) -> Option<Geometry> {
        let mut glyph = SquareGlyphs.glyph(ch, scale)?;
        if ch == 'x' {
            glyph.indices = vec![0, 1, 9];
        }
        Some(glyph)
    }
}

fn vertex_color(h: &Harness, key: &str) -> Vec4 {
    let mesh = h.batch_mesh(key).unwrap();
    let color: [f32; 4] = bytemuck::pod_read_unaligned(&mesh.vertex_data[12..28]);
    Vec4::from_array(color)
}

#[test]
fn double_wire_adds_a_faded_hidden_pass() {
    let mut h = Harness::new(settings(DrawStrategy::Batched));
    h.frame(|d| {
        d.set_draw_type(DrawType::SOLID | DrawType::FRAME_WIRE_DOUBLE);
        d.draw_box();
    });

    for key in [SOLID_KEY, LINE_KEY, HIDDEN_LINE_KEY] {
        assert!(h.stats_for(key).unwrap().active, "{key} inactive");
    }
    assert_eq!(
        h.stats_for(HIDDEN_LINE_KEY).unwrap().index_count,
        h.stats_for(LINE_KEY).unwrap().index_count
    );

    let wire = vertex_color(&h, LINE_KEY);
    let hidden = vertex_color(&h, HIDDEN_LINE_KEY);
    let alpha = h.lifecycle.settings().hidden_wire_alpha;
    assert_eq!(hidden.truncate(), wire.truncate());
    assert!((hidden.w - wire.w * alpha).abs() < 1e-6);

    let node = h.scene.find_by_name(HIDDEN_LINE_KEY).unwrap();
    let material = h.gpu.material(h.scene.renderer(node).unwrap().material).unwrap();
    assert_eq!(material.depth.func, Some(CompareFunc::Greater));
    assert_eq!(material.depth.write, Some(false));
    assert!(material.alpha_blend);
}

#[test]
fn hidden_pass_leaves_draw_state_untouched() {
    let mut h = Harness::new(settings(DrawStrategy::Batched));
    let matrix = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
    h.frame(|d| {
        d.set_draw_type(DrawType::LINE_DOUBLE);
        d.set_technique(Technique::Opaque);
        d.set_matrix(matrix);
        d.depth(Some(true), None, None);
        d.draw_box();

        assert_eq!(d.draw_type(), DrawType::LINE_DOUBLE);
        assert_eq!(d.technique(), Technique::Opaque);
        assert_eq!(d.matrix(), matrix);
        assert_eq!(d.depth_overrides().test, Some(true));
        assert_eq!(d.depth_overrides().func, None);
    });

    assert!(h
        .stats_for("opaque_back_true_unset_unset_line-list")
        .unwrap()
        .active);
    assert!(h
        .stats_for("transparent_back_true_false_greater_line-list")
        .unwrap()
        .active);
}

#[test]
fn line_mode_draws_in_the_current_color() {
    let mut h = Harness::new(settings(DrawStrategy::Batched));
    let color = Vec4::new(0.0, 1.0, 0.0, 1.0);
    h.frame(|d| {
        d.set_draw_type(DrawType::LINE);
        d.set_color(color);
        d.sphere();
    });
    assert_eq!(vertex_color(&h, LINE_KEY), color);
}

#[test]
fn text_lays_glyphs_out_along_x() {
    let mut h = Harness::new(settings(DrawStrategy::Batched));
    let base = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
    h.frame(|d| {
        d.set_glyph_source(Box::new(SquareGlyphs));
        d.set_matrix(base);
        d.text("ab c", 1.0);

        assert_eq!(d.cull(), CullMode::Back);
        assert_eq!(d.matrix(), base);
    });

    let stats = h.stats_for(GLYPH_KEY).unwrap();
    assert_eq!((stats.vertex_count, stats.index_count), (12, 18));

    let mesh = h.batch_mesh(GLYPH_KEY).unwrap();
    assert_position(mesh, 0, Vec3::new(1.0, -0.5, 0.0));
    assert_position(mesh, 4, Vec3::new(2.0, -0.5, 0.0));
    assert_position(mesh, 8, Vec3::new(3.0, -0.5, 0.0));
}

#[test]
fn glyph_spacing_widens_the_pen_advance() {
    let mut s = settings(DrawStrategy::Batched);
    s.glyph_spacing = 0.5;
    let mut h = Harness::new(s);
    h.frame(|d| {
        d.set_glyph_source(Box::new(SquareGlyphs));
        d.text("ab", 1.0);
    });

    let mesh = h.batch_mesh(GLYPH_KEY).unwrap();
    assert_position(mesh, 4, Vec3::new(1.5, -0.5, 0.0));
}

#[test]
fn text_only_draws_in_solid_mode() {
    let mut h = Harness::new(settings(DrawStrategy::Batched));
    h.frame(|d| {
        d.set_glyph_source(Box::new(SquareGlyphs));
        d.set_draw_type(DrawType::LINE);
        d.text("abc", 1.0);
    });
    assert!(h.drawer().stats().is_empty());
}

#[test]
fn text_without_glyph_source_is_skipped() {
    let mut h = Harness::new(settings(DrawStrategy::Batched));
    h.frame(|d| d.text("abc", 1.0));
    assert!(h.drawer().stats().is_empty());
}

#[test]
fn polyline_honours_line_double() {
    let mut h = Harness::new(settings(DrawStrategy::Batched));
    h.frame(|d| {
        d.set_draw_type(DrawType::LINE_DOUBLE);
        d.polyline(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
    });

    assert_eq!(h.stats_for(LINE_KEY).unwrap().index_count, 4);
    assert_eq!(h.stats_for(HIDDEN_LINE_KEY).unwrap().index_count, 4);
}

#[test]
fn glyph_with_stray_index_is_dropped() {
    let mut h = Harness::new(settings(DrawStrategy::Batched));
    h.frame(|d| {
        d.set_glyph_source(Box::new(StrayIndexGlyphs));
        d.text("axb", 1.0);
    });

    let stats = h.stats_for(GLYPH_KEY).unwrap();
    assert_eq!((stats.vertex_count, stats.index_count), (8, 12));
    let mesh = h.batch_mesh(GLYPH_KEY).unwrap();
    assert!(mesh.drawn_indices().iter().all(|&i| i < 8));
}
