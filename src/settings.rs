use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::asset::BUILTIN_UNLIT_EFFECT_ID;
use crate::draw::DrawStrategy;
use crate::error::DrawError;
use crate::renderer::DrawType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawSettings {
    #[serde(default)]
    pub strategy: DrawStrategy,
    #[serde(default = "DrawSettings::default_initial_vertex_floats")]
    pub initial_vertex_floats: usize,
    #[serde(default = "DrawSettings::default_initial_indices")]
    pub initial_indices: usize,
    #[serde(default = "DrawSettings::default_wire_color")]
    pub wire_color: [f32; 4],
    #[serde(default = "DrawSettings::default_hidden_wire_alpha")]
    pub hidden_wire_alpha: f32,
    #[serde(default)]
    pub glyph_spacing: f32,
    #[serde(default = "DrawSettings::default_sphere_segments")]
    pub sphere_segments: u32,
    #[serde(default = "DrawSettings::default_sphere_rings")]
    pub sphere_rings: u32,
    #[serde(default = "DrawSettings::default_effect_id")]
    pub effect_id: String,
    #[serde(default = "DrawSettings::default_node_name")]
    pub node_name: String,
    /// Draw type the lifecycle applies after clearing, at the start of every frame.
    #[serde(default = "DrawSettings::default_frame_draw_type")]
    pub frame_draw_type: DrawType,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            strategy: DrawStrategy::default(),
            initial_vertex_floats: Self::default_initial_vertex_floats(),
            initial_indices: Self::default_initial_indices(),
            wire_color: Self::default_wire_color(),
            hidden_wire_alpha: Self::default_hidden_wire_alpha(),
            glyph_spacing: 0.0,
            sphere_segments: Self::default_sphere_segments(),
            sphere_rings: Self::default_sphere_rings(),
            effect_id: Self::default_effect_id(),
            node_name: Self::default_node_name(),
            frame_draw_type: Self::default_frame_draw_type(),
        }
    }
}

impl DrawSettings {
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, DrawError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| DrawError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str::<DrawSettings>(&contents).map_err(|source| {
            DrawError::SettingsParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(settings.validate())
    }

    /// Loads settings, falling back to defaults when the file is missing or invalid.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(settings) => {
                info!("Loaded debug draw settings from {:?}", path);
                settings
            }
            Err(DrawError::SettingsIo { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!(
                    "Debug draw settings file {:?} not found. Using default settings.",
                    path
                );
                Self::default()
            }
            Err(err) => {
                warn!("{}. Falling back to default debug draw settings.", err);
                Self::default()
            }
        }
    }

    pub fn validate(mut self) -> Self {
        if self.initial_vertex_floats == 0 {
            warn!("Initial vertex capacity must be greater than zero. Using default value.");
            self.initial_vertex_floats = Self::default_initial_vertex_floats();
        }

        if self.initial_indices == 0 {
            warn!("Initial index capacity must be greater than zero. Using default value.");
            self.initial_indices = Self::default_initial_indices();
        }

        if !(0.0..=1.0).contains(&self.hidden_wire_alpha) {
            warn!(
                "Hidden wire alpha {} is outside 0..=1. Clamping.",
                self.hidden_wire_alpha
            );
            self.hidden_wire_alpha = self.hidden_wire_alpha.clamp(0.0, 1.0);
        }

        if self.sphere_segments < 3 || self.sphere_rings < 2 {
            warn!("Sphere tessellation too coarse. Using default values.");
            self.sphere_segments = Self::default_sphere_segments();
            self.sphere_rings = Self::default_sphere_rings();
        }

        self
    }

    const fn default_initial_vertex_floats() -> usize {
        1024
    }

    const fn default_initial_indices() -> usize {
        1024
    }

    const fn default_wire_color() -> [f32; 4] {
        [1.0, 0.0, 0.0, 1.0]
    }

    const fn default_hidden_wire_alpha() -> f32 {
        0.3
    }

    const fn default_sphere_segments() -> u32 {
        32
    }

    const fn default_sphere_rings() -> u32 {
        16
    }

    fn default_effect_id() -> String {
        BUILTIN_UNLIT_EFFECT_ID.to_string()
    }

    fn default_node_name() -> String {
        "DEBUG_GLOBAL_DRAW".to_string()
    }

    const fn default_frame_draw_type() -> DrawType {
        DrawType::SOLID.union(DrawType::FRAME_WIRE_DOUBLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let settings: DrawSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.strategy, DrawStrategy::Batched);
        assert_eq!(settings.initial_vertex_floats, 1024);
        assert_eq!(settings.node_name, "DEBUG_GLOBAL_DRAW");
        assert_eq!(
            settings.frame_draw_type,
            DrawType::SOLID | DrawType::FRAME_WIRE_DOUBLE
        );
    }

    #[test]
    fn frame_draw_type_parses_flag_names() {
        let settings: DrawSettings =
            serde_json::from_str(r#"{ "frame_draw_type": "SOLID | LINE" }"#).unwrap();
        assert_eq!(settings.frame_draw_type, DrawType::SOLID | DrawType::LINE);
    }

    #[test]
    fn strategy_parses_snake_case() {
        let settings: DrawSettings =
            serde_json::from_str(r#"{ "strategy": "instanced" }"#).unwrap();
        assert_eq!(settings.strategy, DrawStrategy::Instanced);
    }

    #[test]
    fn validate_repairs_zero_capacities() {
        let settings = DrawSettings {
            initial_vertex_floats: 0,
            initial_indices: 0,
            hidden_wire_alpha: 4.0,
            ..DrawSettings::default()
        }
        .validate();
        assert_eq!(settings.initial_vertex_floats, 1024);
        assert_eq!(settings.initial_indices, 1024);
        assert_eq!(settings.hidden_wire_alpha, 1.0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = DrawSettings::load_from_path("does/not/exist/debug_draw.json");
        assert_eq!(settings.sphere_segments, 32);
    }
}
