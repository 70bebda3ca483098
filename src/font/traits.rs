use crate::font::Glyph;

/// Read access to a code point to glyph mapping, plus non-destructive growth.
pub trait FontStore: Sized {
    fn get_glyph(&self, codepoint: u32) -> Option<&Glyph>;

    fn contains(&self, codepoint: u32) -> bool {
        self.get_glyph(codepoint).is_some()
    }

    /// Defined code points in ascending order.
    fn codepoints(&self) -> impl Iterator<Item = u32> + '_;

    /// Returns a new store holding this store's glyphs plus `glyphs`.
    /// Code points already defined keep their existing glyph.
    fn with_glyphs<I>(&self, glyphs: I) -> Self
    where
        I: IntoIterator<Item = (u32, Glyph)>;
}
