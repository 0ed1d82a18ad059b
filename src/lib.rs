pub mod asset;
pub mod draw;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use asset::{
    BuiltinEffects, EffectAsset, EffectLoader, EffectRequest, BUILTIN_UNLIT_EFFECT_ID,
};
pub use draw::{DebugDrawer, DrawStrategy};
pub use error::DrawError;
pub use frame::{FrameContext, FrameLifecycle, FramePhase};
pub use geometry::{Geometry, PrimitiveShape, Topology};
pub use renderer::{
    BatchStats, CompareFunc, CullMode, DrawTarget, DrawType, GpuBackend, HeadlessBackend,
    RenderStateKey, Technique, WgpuBackend,
};
pub use scene::SceneGraph;
pub use settings::DrawSettings;

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
