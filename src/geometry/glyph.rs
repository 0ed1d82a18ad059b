use std::collections::HashMap;
use std::sync::Arc;

use super::Geometry;

/// Producer of tessellated glyph outlines (font or SVG path tessellation
/// lives on the other side of this trait).
pub trait GlyphSource {
    /// Solid triangle geometry for `ch` at `scale`, or `None` when the font
    /// has no glyph for it (space, control characters).
    fn glyph(&mut self, ch: char, scale: f32) -> Option<Geometry>;
}

/// Caches glyph geometry per character and scale, including misses.
pub struct GlyphCache {
    source: Box<dyn GlyphSource>,
    glyphs: HashMap<(char, u32), Option<Arc<Geometry>>>,
}

impl GlyphCache {
    pub fn new(source: Box<dyn GlyphSource>) -> Self {
        Self {
            source,
            glyphs: HashMap::new(),
        }
    }

    pub fn get(&mut self, ch: char, scale: f32) -> Option<Arc<Geometry>> {
        let source = &mut self.source;
        self.glyphs
            .entry((ch, scale.to_bits()))
            .or_insert_with(|| source.glyph(ch, scale).map(Arc::new))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
