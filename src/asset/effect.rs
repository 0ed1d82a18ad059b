//! Shading effect handed to the drawer by the host's asset system.
//!
//! Loading is asynchronous: the host completes an [`EffectSender`] whenever the
//! asset arrives and the drawer polls the matching [`EffectRequest`] each time
//! it needs a material. Until then draws for unmaterialized state keys are
//! skipped.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

use crate::error::DrawError;

/// Asset id of the built-in unlit effect all debug materials are made from.
pub const BUILTIN_UNLIT_EFFECT_ID: &str = "a3cd009f-0ab0-420d-9278-b9fdab939bbc";

#[derive(Debug, Clone, PartialEq)]
pub struct EffectAsset {
    pub id: String,
    pub techniques: Vec<String>,
}

impl EffectAsset {
    pub fn new(id: impl Into<String>, techniques: &[&str]) -> Self {
        Self {
            id: id.into(),
            techniques: techniques.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn builtin_unlit() -> Self {
        Self::new(BUILTIN_UNLIT_EFFECT_ID, &["opaque", "transparent"])
    }

    pub fn technique_index(&self, name: &str) -> Option<usize> {
        self.techniques.iter().position(|t| t == name)
    }
}

enum EffectState {
    Pending(Receiver<Result<EffectAsset, DrawError>>),
    Ready(Arc<EffectAsset>),
    Failed,
}

pub struct EffectRequest {
    id: String,
    state: EffectState,
}

/// Completion side of an [`EffectRequest`], owned by the loader.
pub struct EffectSender {
    id: String,
    tx: Sender<Result<EffectAsset, DrawError>>,
}

impl EffectSender {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn complete(self, result: Result<EffectAsset, DrawError>) {
        // The request may already be gone; nothing left to notify then.
        let _ = self.tx.send(result);
    }
}

impl EffectRequest {
    pub fn channel(id: impl Into<String>) -> (Self, EffectSender) {
        let id = id.into();
        let (tx, rx) = mpsc::channel();
        (
            Self {
                id: id.clone(),
                state: EffectState::Pending(rx),
            },
            EffectSender { id, tx },
        )
    }

    pub fn ready(effect: EffectAsset) -> Self {
        Self {
            id: effect.id.clone(),
            state: EffectState::Ready(Arc::new(effect)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, EffectState::Ready(_))
    }

    pub fn has_failed(&self) -> bool {
        matches!(self.state, EffectState::Failed)
    }

    /// Returns the effect once loaded. A failed load is logged once and then
    /// reported as `None` for the rest of the session.
    pub fn poll(&mut self) -> Option<Arc<EffectAsset>> {
        let next = match &self.state {
            EffectState::Ready(effect) => return Some(Arc::clone(effect)),
            EffectState::Failed => return None,
            EffectState::Pending(rx) => match rx.try_recv() {
                Ok(Ok(effect)) => {
                    log::info!(
                        "Effect `{}` loaded with {} techniques",
                        self.id,
                        effect.techniques.len()
                    );
                    EffectState::Ready(Arc::new(effect))
                }
                Ok(Err(err)) => {
                    log::error!("{}", err);
                    EffectState::Failed
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    log::error!("{}", DrawError::EffectChannelClosed(self.id.clone()));
                    EffectState::Failed
                }
            },
        };

        self.state = next;
        match &self.state {
            EffectState::Ready(effect) => Some(Arc::clone(effect)),
            _ => None,
        }
    }
}

/// The host's asset system, as far as the drawer is concerned.
pub trait EffectLoader {
    fn load(&mut self, id: &str) -> EffectRequest;
}

impl<F> EffectLoader for F
where
    F: FnMut(&str) -> EffectRequest,
{
    fn load(&mut self, id: &str) -> EffectRequest {
        self(id)
    }
}

/// Loader that only knows the built-in unlit effect and resolves it at once.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinEffects;

impl EffectLoader for BuiltinEffects {
    fn load(&mut self, id: &str) -> EffectRequest {
        if id == BUILTIN_UNLIT_EFFECT_ID {
            return EffectRequest::ready(EffectAsset::builtin_unlit());
        }
        let (request, sender) = EffectRequest::channel(id);
        sender.complete(Err(DrawError::EffectLoad {
            id: id.to_string(),
            reason: "not a built-in effect".to_string(),
        }));
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_until_completed() {
        let (mut request, sender) = EffectRequest::channel(BUILTIN_UNLIT_EFFECT_ID);
        assert!(request.poll().is_none());
        sender.complete(Ok(EffectAsset::builtin_unlit()));
        let effect = request.poll().expect("effect after completion");
        assert_eq!(effect.technique_index("transparent"), Some(1));
        assert!(request.is_ready());
    }

    #[test]
    fn dropped_loader_marks_request_failed() {
        let (mut request, sender) = EffectRequest::channel("missing");
        drop(sender);
        assert!(request.poll().is_none());
        assert!(request.has_failed());
    }

    #[test]
    fn builtin_loader_knows_only_the_unlit_effect() {
        let mut loader = BuiltinEffects;
        assert!(loader.load(BUILTIN_UNLIT_EFFECT_ID).is_ready());
        let mut other = loader.load("custom");
        assert!(other.poll().is_none());
        assert!(other.has_failed());
    }

    #[test]
    fn load_error_is_terminal() {
        let (mut request, sender) = EffectRequest::channel("broken");
        sender.complete(Err(DrawError::EffectLoad {
            id: "broken".into(),
            reason: "bad bytes".into(),
        }));
        assert!(request.poll().is_none());
        assert!(request.has_failed());
        assert!(request.poll().is_none());
    }
}
