#![allow(dead_code)]

use debug_draw::renderer::HeadlessMesh;
use debug_draw::scene::MeshRenderer;
use debug_draw::{
    BatchStats, BuiltinEffects, DebugDrawer, DrawSettings, DrawStrategy, DrawType, EffectLoader,
    FrameContext, FrameLifecycle, FramePhase, HeadlessBackend, SceneGraph,
};
use glam::Vec3;

pub const SOLID_KEY: &str = "transparent_back_unset_unset_unset_triangle-list";
pub const LINE_KEY: &str = "transparent_back_unset_unset_unset_line-list";
pub const HIDDEN_LINE_KEY: &str = "transparent_back_unset_false_greater_line-list";

/// Settings whose frames start in plain `SOLID` mode, so tests only see the
/// passes they ask for.
pub fn settings(strategy: DrawStrategy) -> DrawSettings {
    DrawSettings {
        strategy,
        frame_draw_type: DrawType::SOLID,
        ..DrawSettings::default()
    }
}

/// A headless host: backend, scene with an active root and an installed
/// lifecycle.
pub struct Harness {
    pub gpu: HeadlessBackend,
    pub scene: SceneGraph,
    pub lifecycle: FrameLifecycle,
}

impl Harness {
    pub fn new(settings: DrawSettings) -> Self {
        Self::with_loader(settings, BuiltinEffects)
    }

    pub fn with_loader(settings: DrawSettings, loader: impl EffectLoader + 'static) -> Self {
        let mut harness = Self {
            gpu: HeadlessBackend::new(),
            scene: SceneGraph::new(),
            lifecycle: FrameLifecycle::new(settings, loader),
        };
        harness.scene.load_scene("test");
        harness.install();
        harness
    }

    pub fn install(&mut self) {
        self.lifecycle
            .install(&mut FrameContext::new(&mut self.gpu, &mut self.scene));
    }

    pub fn uninstall(&mut self) {
        self.lifecycle
            .uninstall(&mut FrameContext::new(&mut self.gpu, &mut self.scene));
    }

    pub fn dispatch(&mut self, phase: FramePhase) {
        self.lifecycle
            .dispatch(phase, &mut FrameContext::new(&mut self.gpu, &mut self.scene));
    }

    /// One full frame: clear, draw, flush.
    pub fn frame(&mut self, draw: impl FnOnce(&mut DebugDrawer)) {
        self.dispatch(FramePhase::PreUpdate);
        draw(self.drawer());
        self.dispatch(FramePhase::PreDraw);
    }

    pub fn drawer(&mut self) -> &mut DebugDrawer {
        self.lifecycle
            .current_drawer()
            .expect("lifecycle has no drawer yet")
    }

    pub fn stats_for(&mut self, key: &str) -> Option<BatchStats> {
        self.drawer()
            .stats()
            .into_iter()
            .find(|s| s.key.id() == key)
    }

    /// Renderer nodes under the drawer root that are currently shown.
    pub fn visible_renderers(&mut self) -> Vec<MeshRenderer> {
        let root = self.drawer().root();
        self.scene
            .children(root)
            .into_iter()
            .filter(|&node| self.scene.is_visible(node))
            .filter_map(|node| self.scene.renderer(node))
            .collect()
    }

    /// The uploaded mesh behind the node named after `key`.
    pub fn batch_mesh(&self, key: &str) -> Option<&HeadlessMesh> {
        let node = self.scene.find_by_name(key)?;
        let renderer = self.scene.renderer(node)?;
        self.gpu.mesh(renderer.mesh)
    }
}

pub fn assert_position(mesh: &HeadlessMesh, i: usize, expected: Vec3) {
    let actual = Vec3::from_array(mesh.position(i).expect("vertex in range"));
    assert!(
        actual.abs_diff_eq(expected, 1e-5),
        "vertex {}: {:?} != {:?}",
        i,
        actual,
        expected
    );
}
