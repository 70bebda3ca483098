use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::Arc;

use ahash::RandomState;

use super::bitmap::Bitmap;
use super::traits::FontStore;

/// Glyphs are shared between code points that alias the same bitmap.
pub type Glyph = Arc<Bitmap>;

/// A bitmap font: a map from code point to glyph plus its metadata.
///
/// Every mutation after loading goes through methods returning a new `Font`;
/// glyph bitmaps are never modified in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Font {
    /// Nominal pixel size of the source font (8, 14 or 16 for CPIDOS).
    pixel_size: u32,
    /// Comment lines carried through from HEX input, without the `#`.
    comments: Vec<String>,
    glyphs: BTreeMap<u32, Glyph>,
}

impl Font {
    pub fn new(pixel_size: u32) -> Self {
        Self {
            pixel_size,
            ..Default::default()
        }
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn push_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }

    /// Inserts a glyph while building a font.
    ///
    /// Returns the glyph back if the code point is already taken; the
    /// existing glyph is left in place.
    pub fn insert(&mut self, codepoint: u32, glyph: Glyph) -> Result<(), Glyph> {
        match self.glyphs.entry(codepoint) {
            Entry::Occupied(_) => Err(glyph),
            Entry::Vacant(slot) => {
                slot.insert(glyph);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Iterates over (code point, glyph) pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Glyph)> + '_ {
        self.glyphs.iter().map(|(&cp, glyph)| (cp, glyph))
    }

    /// Returns a font with the glyphs of `other` added where this font has none.
    pub fn merged_with(&self, other: &Font) -> Font {
        self.with_glyphs(other.iter().map(|(cp, glyph)| (cp, Arc::clone(glyph))))
    }

    /// Returns a font restricted to the given code points.
    pub fn subset(&self, codepoints: &HashSet<u32, RandomState>) -> Font {
        self.filtered(|cp| codepoints.contains(&cp))
    }

    /// Returns a font without the code points in `range`.
    pub fn without(&self, range: RangeInclusive<u32>) -> Font {
        self.filtered(|cp| !range.contains(&cp))
    }

    /// Returns a font whose glyphs are padded at the bottom to `height` rows.
    /// Glyphs already at least that high are shared unchanged.
    pub fn expanded_to(&self, height: u32) -> Font {
        let glyphs = self
            .glyphs
            .iter()
            .map(|(&cp, glyph)| {
                let glyph = if glyph.height() < height {
                    Arc::new(glyph.expand(height - glyph.height()))
                } else {
                    Arc::clone(glyph)
                };
                (cp, glyph)
            })
            .collect();
        Font {
            pixel_size: self.pixel_size,
            comments: self.comments.clone(),
            glyphs,
        }
    }

    fn filtered(&self, keep: impl Fn(u32) -> bool) -> Font {
        Font {
            pixel_size: self.pixel_size,
            comments: self.comments.clone(),
            glyphs: self
                .glyphs
                .iter()
                .filter(|(&cp, _)| keep(cp))
                .map(|(&cp, glyph)| (cp, Arc::clone(glyph)))
                .collect(),
        }
    }
}

impl FontStore for Font {
    fn get_glyph(&self, codepoint: u32) -> Option<&Glyph> {
        self.glyphs.get(&codepoint)
    }

    fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.glyphs.keys().copied()
    }

    fn with_glyphs<I>(&self, glyphs: I) -> Self
    where
        I: IntoIterator<Item = (u32, Glyph)>,
    {
        let mut font = self.clone();
        for (cp, glyph) in glyphs {
            font.glyphs.entry(cp).or_insert(glyph);
        }
        font
    }
}
