use std::collections::HashMap;

use ahash::RandomState;
use unicode_normalization::UnicodeNormalization;

/// Canonical composition and decomposition of single code points.
pub trait Normalizer {
    /// NFC of the one-character string `codepoint`.
    fn nfc(&self, codepoint: u32) -> Vec<u32>;
    /// NFD of the one-character string `codepoint`.
    fn nfd(&self, codepoint: u32) -> Vec<u32>;
}

/// Normalization backed by the Unicode character database tables of the
/// `unicode-normalization` crate.
///
/// Code points that are not Unicode scalar values (surrogates) normalize to
/// themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeNormalizer;

impl Normalizer for UnicodeNormalizer {
    fn nfc(&self, codepoint: u32) -> Vec<u32> {
        match char::from_u32(codepoint) {
            Some(c) => std::iter::once(c).nfc().map(u32::from).collect(),
            None => vec![codepoint],
        }
    }

    fn nfd(&self, codepoint: u32) -> Vec<u32> {
        match char::from_u32(codepoint) {
            Some(c) => std::iter::once(c).nfd().map(u32::from).collect(),
            None => vec![codepoint],
        }
    }
}

/// A small explicit normalization table. Code points without an entry
/// normalize to themselves.
#[derive(Debug, Default, Clone)]
pub struct TableNormalizer {
    compositions: HashMap<u32, Vec<u32>, RandomState>,
    decompositions: HashMap<u32, Vec<u32>, RandomState>,
}

impl TableNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the NFC result for `codepoint`.
    pub fn with_composition(mut self, codepoint: u32, composed: impl Into<Vec<u32>>) -> Self {
        self.compositions.insert(codepoint, composed.into());
        self
    }

    /// Sets the NFD result for `codepoint`.
    pub fn with_decomposition(mut self, codepoint: u32, parts: impl Into<Vec<u32>>) -> Self {
        self.decompositions.insert(codepoint, parts.into());
        self
    }
}

impl Normalizer for TableNormalizer {
    fn nfc(&self, codepoint: u32) -> Vec<u32> {
        self.compositions
            .get(&codepoint)
            .cloned()
            .unwrap_or_else(|| vec![codepoint])
    }

    fn nfd(&self, codepoint: u32) -> Vec<u32> {
        self.decompositions
            .get(&codepoint)
            .cloned()
            .unwrap_or_else(|| vec![codepoint])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_precomposed() {
        let n = UnicodeNormalizer;
        assert_eq!(n.nfc(0xC0), vec![0xC0]);
        assert_eq!(n.nfd(0xC0), vec![0x41, 0x300]);
    }

    #[test]
    fn test_unicode_singleton() {
        // ANGSTROM SIGN composes to LATIN CAPITAL LETTER A WITH RING ABOVE
        let n = UnicodeNormalizer;
        assert_eq!(n.nfc(0x212B), vec![0xC5]);
        assert_eq!(n.nfd(0x212B), vec![0x41, 0x30A]);
    }

    #[test]
    fn test_unicode_multi_level_decomposition() {
        // LATIN SMALL LETTER A WITH CIRCUMFLEX AND ACUTE
        let n = UnicodeNormalizer;
        assert_eq!(n.nfd(0x1EA5), vec![0x61, 0x302, 0x301]);
    }

    #[test]
    fn test_unicode_identity_and_surrogate() {
        let n = UnicodeNormalizer;
        assert_eq!(n.nfc(0x41), vec![0x41]);
        assert_eq!(n.nfd(0x41), vec![0x41]);
        assert_eq!(n.nfc(0xD800), vec![0xD800]);
        assert_eq!(n.nfd(0xDFFF), vec![0xDFFF]);
    }

    #[test]
    fn test_table_normalizer() {
        let n = TableNormalizer::new()
            .with_composition(0x10, [0x20])
            .with_decomposition(0x11, [0x1, 0x2]);
        assert_eq!(n.nfc(0x10), vec![0x20]);
        assert_eq!(n.nfc(0x11), vec![0x11]);
        assert_eq!(n.nfd(0x11), vec![0x1, 0x2]);
        assert_eq!(n.nfd(0x10), vec![0x10]);
    }
}
