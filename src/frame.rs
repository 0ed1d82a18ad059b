//! Frame hooks driving the debug drawer: `PreUpdate` clears it and applies
//! the configured frame draw type, `PreDraw` flushes it. The host owns one
//! `FrameLifecycle`, calls `install` during startup and `uninstall` +
//! `install` on hot reload.

use crate::asset::EffectLoader;
use crate::draw::DebugDrawer;
use crate::renderer::GpuBackend;
use crate::scene::{NodeFlags, SceneGraph};
use crate::settings::DrawSettings;

/// What a drawer needs from the host for one hook.
pub struct FrameContext<'a> {
    pub gpu: &'a mut dyn GpuBackend,
    pub scene: &'a mut SceneGraph,
}

impl<'a> FrameContext<'a> {
    pub fn new(gpu: &'a mut dyn GpuBackend, scene: &'a mut SceneGraph) -> Self {
        Self { gpu, scene }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// Before game logic runs; the frame's draw configuration starts here.
    PreUpdate,
    /// After game logic, before rendering.
    PreDraw,
}

pub struct FrameLifecycle {
    settings: DrawSettings,
    loader: Box<dyn EffectLoader>,
    drawer: Option<DebugDrawer>,
    installed: bool,
}

impl FrameLifecycle {
    pub fn new(settings: DrawSettings, loader: impl EffectLoader + 'static) -> Self {
        Self {
            settings,
            loader: Box::new(loader),
            drawer: None,
            installed: false,
        }
    }

    pub fn settings(&self) -> &DrawSettings {
        &self.settings
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Subscribes to the frame hooks. Anything left from a previous install,
    /// including a stray backing node with the well-known name, is torn down
    /// first.
    pub fn install(&mut self, ctx: &mut FrameContext<'_>) {
        if self.installed {
            self.uninstall(ctx);
        }
        if let Some(stale) = ctx.scene.find_by_name(&self.settings.node_name) {
            log::info!("Removing stale `{}` node", self.settings.node_name);
            ctx.scene.destroy_node(stale);
        }
        self.installed = true;
        log::info!("Debug draw installed");
    }

    pub fn uninstall(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(mut drawer) = self.drawer.take() {
            drawer.destroy(ctx);
        }
        if self.installed {
            log::info!("Debug draw uninstalled");
        }
        self.installed = false;
    }

    /// Runs the hook for `phase`. Does nothing until installed or while no
    /// scene is active.
    pub fn dispatch(&mut self, phase: FramePhase, ctx: &mut FrameContext<'_>) {
        if !self.installed {
            return;
        }
        let Some(drawer) = self.drawer(ctx) else {
            return;
        };
        match phase {
            FramePhase::PreUpdate => {
                drawer.clear(ctx);
                let draw_type = drawer.settings().frame_draw_type;
                drawer.set_draw_type(draw_type);
            }
            FramePhase::PreDraw => drawer.finish(ctx),
        }
    }

    /// The drawer for the active scene. Recreates the backing node, and a
    /// fresh drawer with it, if the node was destroyed behind our back.
    pub fn drawer(&mut self, ctx: &mut FrameContext<'_>) -> Option<&mut DebugDrawer> {
        let scene_root = ctx.scene.active_scene()?;

        let alive = self
            .drawer
            .as_ref()
            .is_some_and(|d| ctx.scene.is_alive(d.root()));
        if !alive {
            if let Some(mut stale) = self.drawer.take() {
                log::info!(
                    "`{}` node was destroyed; recreating the debug drawer",
                    self.settings.node_name
                );
                stale.destroy(ctx);
            }

            let node = match ctx.scene.find_by_name(&self.settings.node_name) {
                Some(node) => node,
                None => {
                    let node = ctx
                        .scene
                        .create_node(&self.settings.node_name, Some(scene_root));
                    ctx.scene
                        .set_flags(node, NodeFlags::DONT_SAVE | NodeFlags::HIDE_IN_HIERARCHY);
                    node
                }
            };

            let effect = self.loader.load(&self.settings.effect_id);
            self.drawer = Some(DebugDrawer::new(self.settings.clone(), effect, node));
        }

        self.drawer.as_mut()
    }

    /// The current drawer without touching the scene. Draw calls only need
    /// this; `None` before the first hook of an installed lifecycle.
    pub fn current_drawer(&mut self) -> Option<&mut DebugDrawer> {
        self.drawer.as_mut()
    }
}
