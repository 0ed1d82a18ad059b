// renderer/state.rs
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::Topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CullMode {
    Back,
    Front,
    None,
}

impl CullMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Front => "front",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl CompareFunc {
    pub fn name(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Less => "less",
            Self::Equal => "equal",
            Self::LessEqual => "less-equal",
            Self::Greater => "greater",
            Self::NotEqual => "not-equal",
            Self::GreaterEqual => "greater-equal",
            Self::Always => "always",
        }
    }
}

/// Named technique inside the unlit effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technique {
    Opaque,
    Transparent,
}

impl Technique {
    pub fn name(self) -> &'static str {
        match self {
            Self::Opaque => "opaque",
            Self::Transparent => "transparent",
        }
    }

    pub fn uses_alpha_blending(self) -> bool {
        matches!(self, Self::Transparent)
    }
}

bitflags! {
    /// Which passes a shape request produces. Flags combine freely.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DrawType: u32 {
        const SOLID = 1 << 0;
        const FRAME_WIRE = 1 << 1;
        const FRAME_WIRE_DOUBLE = 1 << 2;
        const LINE = 1 << 3;
        const LINE_DOUBLE = 1 << 4;
    }
}

impl DrawType {
    pub fn wants_frame_wire(self) -> bool {
        self.intersects(Self::FRAME_WIRE | Self::FRAME_WIRE_DOUBLE)
    }

    pub fn wants_line(self) -> bool {
        self.intersects(Self::LINE | Self::LINE_DOUBLE)
    }

    /// True when an extra hidden-edge pass should follow the outline.
    pub fn wants_hidden_pass(self) -> bool {
        self.intersects(Self::FRAME_WIRE_DOUBLE | Self::LINE_DOUBLE)
    }
}

/// Depth overrides; `None` leaves the technique's own setting in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DepthOverrides {
    pub test: Option<bool>,
    pub write: Option<bool>,
    pub func: Option<CompareFunc>,
}

/// Identity of a batch. Draws with equal keys share a material and a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderStateKey {
    pub technique: Technique,
    pub cull: CullMode,
    pub depth: DepthOverrides,
    pub topology: Topology,
}

impl RenderStateKey {
    pub fn id(&self) -> String {
        self.to_string()
    }
}

fn opt_name<T>(value: Option<T>, name: impl Fn(T) -> String) -> String {
    value.map_or_else(|| "unset".to_string(), name)
}

impl fmt::Display for RenderStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}_{}",
            self.technique.name(),
            self.cull.name(),
            opt_name(self.depth.test, |v| v.to_string()),
            opt_name(self.depth.write, |v| v.to_string()),
            opt_name(self.depth.func, |v| v.name().to_string()),
            self.topology.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key(topology: Topology) -> RenderStateKey {
        RenderStateKey {
            technique: Technique::Transparent,
            cull: CullMode::Back,
            depth: DepthOverrides::default(),
            topology,
        }
    }

    #[test]
    fn equal_configurations_share_identity() {
        let mut set = HashSet::new();
        set.insert(key(Topology::TriangleList));
        set.insert(key(Topology::TriangleList));
        assert_eq!(set.len(), 1);
        assert_eq!(
            key(Topology::TriangleList).id(),
            "transparent_back_unset_unset_unset_triangle-list"
        );
    }

    #[test]
    fn topology_splits_otherwise_equal_keys() {
        assert_ne!(key(Topology::TriangleList), key(Topology::LineList));
        assert_ne!(key(Topology::TriangleList).id(), key(Topology::LineList).id());
    }

    #[test]
    fn depth_overrides_take_part_in_identity() {
        let mut overridden = key(Topology::LineList);
        overridden.depth.func = Some(CompareFunc::Greater);
        assert_ne!(overridden, key(Topology::LineList));
        assert!(overridden.id().contains("greater"));
    }

    #[test]
    fn draw_type_flags_combine() {
        let ty = DrawType::SOLID | DrawType::FRAME_WIRE_DOUBLE;
        assert!(ty.contains(DrawType::SOLID));
        assert!(ty.wants_frame_wire());
        assert!(ty.wants_hidden_pass());
        assert!(!ty.wants_line());
    }
}
