pub mod effect;
pub mod handle;

pub use effect::{
    BuiltinEffects, EffectAsset, EffectLoader, EffectRequest, EffectSender, BUILTIN_UNLIT_EFFECT_ID,
};
pub use handle::Handle;
