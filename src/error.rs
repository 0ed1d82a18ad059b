use std::path::PathBuf;

use thiserror::Error;

/// Recoverable failures. Callers log these and keep the frame going.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("failed to load effect `{id}`: {reason}")]
    EffectLoad { id: String, reason: String },

    #[error("loader for effect `{0}` went away before completing")]
    EffectChannelClosed(String),

    #[error("graphics device unavailable: {0}")]
    Device(String),

    #[error("failed to read settings {path:?}: {source}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings {path:?}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
