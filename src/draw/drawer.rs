use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use hecs::Entity;

use super::DrawStrategy;
use crate::asset::EffectRequest;
use crate::frame::FrameContext;
use crate::geometry::{
    wireframe, Geometry, GeometryCache, GlyphCache, GlyphSource, IndexExpansion, PrimitiveShape,
    ShapeParams, Topology,
};
use crate::renderer::{
    BatchStats, BatchedTarget, CompareFunc, CullMode, DepthOverrides, DrawRequest, DrawTarget,
    DrawType, GeometryId, InstancePool, MaterialCache, RenderStateKey, Technique,
};
use crate::settings::DrawSettings;

/// Mutable draw configuration. Reset to these defaults at the start of
/// every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawState {
    color: Vec4,
    draw_type: DrawType,
    cull: CullMode,
    depth: DepthOverrides,
    technique: Technique,
    matrix: Mat4,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            draw_type: DrawType::SOLID,
            cull: CullMode::Back,
            depth: DepthOverrides::default(),
            technique: Technique::Transparent,
            matrix: Mat4::IDENTITY,
        }
    }
}

/// Immediate-mode drawer. Draw calls only touch CPU memory; `finish`
/// publishes the frame to the GPU and the scene.
pub struct DebugDrawer {
    settings: DrawSettings,
    state: DrawState,
    wire_color: Vec4,
    shapes: GeometryCache,
    glyphs: Option<GlyphCache>,
    target: Box<dyn DrawTarget>,
    materials: MaterialCache,
    root: Entity,
}

impl DebugDrawer {
    /// Creates a drawer whose renderer nodes hang under `root`.
    pub fn new(settings: DrawSettings, effect: EffectRequest, root: Entity) -> Self {
        let strategy = settings.strategy;
        let target: Box<dyn DrawTarget> = match strategy {
            DrawStrategy::Batched => Box::new(BatchedTarget::new(
                settings.initial_vertex_floats,
                settings.initial_indices,
            )),
            DrawStrategy::Instanced => Box::new(InstancePool::new()),
        };
        log::info!("Debug drawer using the {:?} strategy", strategy);

        Self {
            wire_color: Vec4::from_array(settings.wire_color),
            shapes: GeometryCache::new(ShapeParams {
                segments: settings.sphere_segments,
                rings: settings.sphere_rings,
            }),
            glyphs: None,
            target,
            materials: MaterialCache::new(effect, strategy.use_vertex_color()),
            state: DrawState::default(),
            root,
            settings,
        }
    }

    pub fn strategy(&self) -> DrawStrategy {
        self.settings.strategy
    }

    pub fn settings(&self) -> &DrawSettings {
        &self.settings
    }

    /// Backing node all renderer nodes are parented to.
    pub fn root(&self) -> Entity {
        self.root
    }

    pub fn set_glyph_source(&mut self, source: Box<dyn GlyphSource>) {
        self.glyphs = Some(GlyphCache::new(source));
    }

    // --- configuration -------------------------------------------------

    pub fn reset_state(&mut self) {
        self.state = DrawState::default();
    }

    pub fn color(&self) -> Vec4 {
        self.state.color
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.state.color = color;
    }

    pub fn wire_color(&self) -> Vec4 {
        self.wire_color
    }

    pub fn set_wire_color(&mut self, color: Vec4) {
        self.wire_color = color;
    }

    pub fn draw_type(&self) -> DrawType {
        self.state.draw_type
    }

    pub fn set_draw_type(&mut self, draw_type: DrawType) {
        self.state.draw_type = draw_type;
    }

    pub fn cull(&self) -> CullMode {
        self.state.cull
    }

    pub fn set_cull(&mut self, cull: CullMode) {
        self.state.cull = cull;
    }

    pub fn technique(&self) -> Technique {
        self.state.technique
    }

    pub fn set_technique(&mut self, technique: Technique) {
        self.state.technique = technique;
    }

    pub fn matrix(&self) -> Mat4 {
        self.state.matrix
    }

    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.state.matrix = matrix;
    }

    pub fn depth_overrides(&self) -> DepthOverrides {
        self.state.depth
    }

    /// Overrides depth state for subsequent draws. `None` keeps whatever the
    /// technique does.
    pub fn depth(&mut self, test: Option<bool>, write: Option<bool>, func: Option<CompareFunc>) {
        self.state.depth = DepthOverrides { test, write, func };
    }

    // --- frame -----------------------------------------------------------

    pub fn clear(&mut self, ctx: &mut FrameContext<'_>) {
        self.reset_state();
        self.target.reset(ctx);
    }

    pub fn finish(&mut self, ctx: &mut FrameContext<'_>) {
        self.target.finish(ctx, self.root, &mut self.materials);
    }

    /// Releases every mesh, material and node this drawer created,
    /// including its backing node.
    pub fn destroy(&mut self, ctx: &mut FrameContext<'_>) {
        self.target.destroy(ctx);
        self.materials.destroy(&mut *ctx.gpu);
        ctx.scene.destroy_node(self.root);
    }

    pub fn stats(&self) -> Vec<BatchStats> {
        self.target.stats()
    }

    // --- shapes ----------------------------------------------------------

    /// Draws a procedural shape by name. Unknown names draw a box.
    pub fn primitive(&mut self, name: &str) {
        self.shape(GeometryCache::resolve(name));
    }

    pub fn shape(&mut self, shape: PrimitiveShape) {
        let ty = self.state.draw_type;

        if ty.contains(DrawType::SOLID) {
            let geometry = self.shapes.shape(shape);
            self.submit(
                &geometry,
                GeometryId::Shape(shape),
                IndexExpansion::Direct,
                Topology::TriangleList,
                self.state.color,
            );
        }

        if ty.wants_frame_wire() {
            let geometry = self.shapes.shape(shape);
            self.outline_pass(
                &geometry,
                GeometryId::Shape(shape),
                IndexExpansion::TriangleEdges,
                self.wire_color,
                ty.contains(DrawType::FRAME_WIRE_DOUBLE),
            );
        }

        if ty.wants_line() {
            let (geometry, id, expansion) = match self.shapes.outline(shape) {
                Some(outline) => (outline, GeometryId::Outline(shape), IndexExpansion::Direct),
                None => (
                    self.shapes.shape(shape),
                    GeometryId::Shape(shape),
                    IndexExpansion::TriangleEdges,
                ),
            };
            self.outline_pass(
                &geometry,
                id,
                expansion,
                self.state.color,
                ty.contains(DrawType::LINE_DOUBLE),
            );
        }
    }

    /// `box` is a keyword, hence the prefix.
    pub fn draw_box(&mut self) {
        self.shape(PrimitiveShape::Box);
    }

    pub fn sphere(&mut self) {
        self.shape(PrimitiveShape::Sphere);
    }

    pub fn cylinder(&mut self) {
        self.shape(PrimitiveShape::Cylinder);
    }

    pub fn cone(&mut self) {
        self.shape(PrimitiveShape::Cone);
    }

    pub fn capsule(&mut self) {
        self.shape(PrimitiveShape::Capsule);
    }

    pub fn torus(&mut self) {
        self.shape(PrimitiveShape::Torus);
    }

    pub fn quad(&mut self) {
        self.shape(PrimitiveShape::Quad);
    }

    pub fn plane(&mut self) {
        self.shape(PrimitiveShape::Plane);
    }

    // --- lines and text --------------------------------------------------

    /// Draws each point group as a closed loop (a two-point group is one
    /// segment) in the current color.
    pub fn line<G: AsRef<[Vec3]>>(&mut self, groups: &[G]) {
        let geometry = wireframe::line_loops(groups);
        if geometry.indices.is_empty() {
            return;
        }
        let id = GeometryId::adhoc(&geometry);
        self.outline_pass(
            &geometry,
            id,
            IndexExpansion::Direct,
            self.state.color,
            self.state.draw_type.contains(DrawType::LINE_DOUBLE),
        );
    }

    /// Open polyline through `points`, no closing segment. Honours
    /// `LINE_DOUBLE` like [`Self::line`].
    pub fn polyline(&mut self, points: &[Vec3]) {
        if points.len() < 2 {
            return;
        }
        let geometry = wireframe::polyline(points);
        let id = GeometryId::adhoc(&geometry);
        self.outline_pass(
            &geometry,
            id,
            IndexExpansion::Strip,
            self.state.color,
            self.state.draw_type.contains(DrawType::LINE_DOUBLE),
        );
    }

    /// Lays glyphs out along local +X, each centered on its cell. Glyphs are
    /// drawn double-sided; cull mode and matrix are restored afterwards.
    pub fn text(&mut self, text: &str, scale: f32) {
        if !self.state.draw_type.contains(DrawType::SOLID) {
            return;
        }
        let Some(glyphs) = self.glyphs.as_mut() else {
            log::debug!("No glyph source set; skipping text `{}`", text);
            return;
        };
        let laid_out: Vec<(char, Arc<Geometry>)> = text
            .chars()
            .filter_map(|ch| glyphs.get(ch, scale).map(|g| (ch, g)))
            .collect();
        let spacing = self.settings.glyph_spacing;

        self.with_scoped_state(|drawer| {
            drawer.state.cull = CullMode::None;
            let base = drawer.state.matrix;
            let mut pen = 0.0;
            for (ch, geometry) in &laid_out {
                let width = geometry.width();
                drawer.state.matrix =
                    base * Mat4::from_translation(Vec3::new(pen + width / 2.0, 0.0, 0.0));
                drawer.submit(
                    geometry,
                    GeometryId::Glyph {
                        ch: *ch,
                        scale_bits: scale.to_bits(),
                    },
                    IndexExpansion::Direct,
                    Topology::TriangleList,
                    drawer.state.color,
                );
                pen += width + spacing;
            }
        });
    }

    // --- internals -------------------------------------------------------

    /// Runs `f` and puts the draw state back exactly as it was.
    fn with_scoped_state<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.state;
        let result = f(self);
        self.state = saved;
        result
    }

    /// Line-list draw, optionally followed by the hidden-edge pass: reversed
    /// depth test, no depth write, transparent and faded.
    fn outline_pass(
        &mut self,
        geometry: &Geometry,
        id: GeometryId,
        expansion: IndexExpansion,
        color: Vec4,
        hidden_pass: bool,
    ) {
        self.submit(geometry, id, expansion, Topology::LineList, color);
        if !hidden_pass {
            return;
        }

        let alpha = self.settings.hidden_wire_alpha;
        self.with_scoped_state(|drawer| {
            drawer.state.depth.func = Some(CompareFunc::Greater);
            drawer.state.depth.write = Some(false);
            drawer.state.technique = Technique::Transparent;
            let faded = Vec4::new(color.x, color.y, color.z, color.w * alpha);
            drawer.submit(geometry, id, expansion, Topology::LineList, faded);
        });
    }

    fn submit(
        &mut self,
        geometry: &Geometry,
        geometry_id: GeometryId,
        expansion: IndexExpansion,
        topology: Topology,
        color: Vec4,
    ) -> bool {
        let key = RenderStateKey {
            technique: self.state.technique,
            cull: self.state.cull,
            depth: self.state.depth,
            topology,
        };
        self.target.append(&DrawRequest {
            geometry,
            geometry_id,
            expansion,
            transform: self.state.matrix,
            color,
            key,
        })
    }
}
