//! Filling in missing Plane 0 glyphs from canonically equivalent ones.
//!
//! For every undefined code point the composer first looks for a glyph at its
//! NFC equivalent and shares that glyph. Failing that, it overlays the glyphs
//! of the NFD parts when all of them are present.
//!
//! Membership is always checked against the code points defined before the
//! pass started, so a glyph created in this pass is never used as a part of
//! another one. Running the composer twice therefore gives the same font as
//! running it once.

use std::collections::HashSet;
use std::sync::Arc;

use ahash::RandomState;

use crate::constants::PLANE0_LAST;
use crate::font::{Bitmap, BitmapError, FontStore, Glyph};
use crate::normalize::Normalizer;

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Cannot compose U+{codepoint:04X}: {source}")]
    Superimpose {
        codepoint: u32,
        #[source]
        source: BitmapError,
    },
}

/// Counts of glyphs added by one composition pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeStats {
    /// Code points that now share the glyph of their NFC equivalent.
    pub aliased: usize,
    /// Code points that received a new glyph overlaid from their NFD parts.
    pub synthesized: usize,
}

impl ComposeStats {
    pub fn total(&self) -> usize {
        self.aliased + self.synthesized
    }
}

pub struct Composer<N> {
    normalizer: N,
}

impl<N: Normalizer> Composer<N> {
    pub fn new(normalizer: N) -> Self {
        Self { normalizer }
    }

    /// Returns a copy of `font` with composable Plane 0 code points filled in.
    pub fn compose<F: FontStore>(&self, font: &F) -> Result<(F, ComposeStats), ComposeError> {
        let defined: HashSet<u32, RandomState> = font.codepoints().collect();
        let mut stats = ComposeStats::default();
        let mut additions: Vec<(u32, Glyph)> = Vec::new();

        for codepoint in 0..=PLANE0_LAST {
            if defined.contains(&codepoint) {
                continue;
            }

            if let Some(glyph) = self.equivalent_glyph(font, codepoint) {
                additions.push((codepoint, Arc::clone(glyph)));
                stats.aliased += 1;
                continue;
            }

            let parts = self.normalizer.nfd(codepoint);
            if parts.is_empty() || !parts.iter().all(|part| defined.contains(part)) {
                continue;
            }
            let layers = parts
                .iter()
                .filter_map(|&part| font.get_glyph(part))
                .map(|glyph| &**glyph);
            let composed = Bitmap::superimpose_all(layers)
                .map_err(|source| ComposeError::Superimpose { codepoint, source })?;
            if let Some(bitmap) = composed {
                log::trace!("U+{:04X} composed from {:04X?}", codepoint, parts);
                additions.push((codepoint, Arc::new(bitmap)));
                stats.synthesized += 1;
            }
        }

        log::debug!(
            "Composition added {} aliased and {} synthesized glyphs",
            stats.aliased,
            stats.synthesized
        );
        Ok((font.with_glyphs(additions), stats))
    }

    /// The glyph of the single-character NFC equivalent, if it differs from
    /// `codepoint` and the font defines it.
    fn equivalent_glyph<'f, F: FontStore>(&self, font: &'f F, codepoint: u32) -> Option<&'f Glyph> {
        let composed = self.normalizer.nfc(codepoint);
        match composed.as_slice() {
            &[equivalent] if equivalent != codepoint => font.get_glyph(equivalent),
            _ => None,
        }
    }
}
