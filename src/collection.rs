use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::choices::Selector;
use crate::font::Font;
use crate::hex::{self, HexError};

#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("Failed to list font directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Hex(#[from] HexError),
}

/// One codepage font extracted from a CPI file.
#[derive(Debug, Clone)]
pub struct SourceFont {
    pub cpi_name: String,
    /// Codepage name with its `cp` prefix.
    pub codepage: String,
    pub font: Font,
}

/// Parsed form of a `{cpi}_{codepage}_{size}.hex` file name.
///
/// `.hext` files are the extracted fonts already padded to the cell height.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceName {
    cpi_name: String,
    codepage: String,
    size: u32,
    padded: bool,
}

impl SourceName {
    fn parse(file_name: &str) -> Option<Self> {
        let (stem, padded) = match file_name.strip_suffix(".hext") {
            Some(stem) => (stem, true),
            None => (file_name.strip_suffix(".hex")?, false),
        };
        let mut parts = stem.rsplitn(3, '_');
        let size = parts.next()?.parse().ok()?;
        let codepage = parts.next()?;
        let cpi_name = parts.next()?;
        if codepage.is_empty() || cpi_name.is_empty() {
            return None;
        }
        Some(Self {
            cpi_name: cpi_name.to_string(),
            codepage: codepage.to_string(),
            size,
            padded,
        })
    }

    /// Row count of the glyphs stored in the file.
    fn glyph_height(&self, cell_height: u32) -> u32 {
        if self.padded {
            cell_height.max(self.size)
        } else {
            self.size
        }
    }
}

/// All codepage fonts, grouped by pixel size, in merge order.
#[derive(Debug, Clone, Default)]
pub struct SourceCollection {
    by_size: BTreeMap<u32, Vec<SourceFont>>,
}

impl SourceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every HEX file in `dir` whose size is listed in `sizes`.
    ///
    /// Glyphs of `.hex` files are read as `size` rows high, those of `.hext`
    /// files as `cell_height` rows high; all are padded to `cell_height`.
    /// Fonts are ordered by the position of their CPI in `cpi_names`
    /// (unknown CPIs last, by name), then by codepage number.
    pub fn load(
        dir: &Path,
        cpi_names: &[String],
        sizes: &[u32],
        cell_height: u32,
    ) -> Result<Self, CollectionError> {
        let io_err = |source| CollectionError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut found = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match SourceName::parse(file_name) {
                Some(name) if sizes.contains(&name.size) => found.push((name, path)),
                Some(name) => log::debug!("Skipping {} (size {} not built)", file_name, name.size),
                None => log::debug!("Skipping {}", file_name),
            }
        }

        found.sort_by(|(a, _), (b, _)| load_order(cpi_names, a, b));

        let mut collection = Self::new();
        for size in sizes {
            collection.by_size.entry(*size).or_default();
        }
        for (name, path) in found {
            log::debug!("Reading {}", path.display());
            let height = name.glyph_height(cell_height);
            let font = hex::load(&path, name.size, height)?.expanded_to(cell_height);
            collection.insert(SourceFont {
                cpi_name: name.cpi_name,
                codepage: name.codepage,
                font,
            });
        }
        Ok(collection)
    }

    /// Appends a font after those already loaded for its size.
    pub fn insert(&mut self, source: SourceFont) {
        self.by_size
            .entry(source.font.pixel_size())
            .or_default()
            .push(source);
    }

    pub fn sizes(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_size.keys().copied()
    }

    pub fn fonts(&self, size: u32) -> &[SourceFont] {
        self.by_size.get(&size).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fonts of `size` that a choices selector applies to, in merge order.
    pub fn matching<'a>(
        &'a self,
        size: u32,
        selector: &'a Selector,
    ) -> impl Iterator<Item = &'a SourceFont> + 'a {
        self.fonts(size)
            .iter()
            .filter(move |source| selector.matches(&source.cpi_name, &source.codepage))
    }

    pub fn len(&self) -> usize {
        self.by_size.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn load_order(cpi_names: &[String], a: &SourceName, b: &SourceName) -> Ordering {
    let rank = |name: &SourceName| {
        cpi_names
            .iter()
            .position(|cpi| *cpi == name.cpi_name)
            .unwrap_or(usize::MAX)
    };
    let number = |name: &SourceName| {
        name.codepage
            .strip_prefix("cp")
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(u32::MAX)
    };
    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.cpi_name.cmp(&b.cpi_name))
        .then_with(|| number(a).cmp(&number(b)))
        .then_with(|| a.codepage.cmp(&b.codepage))
        .then_with(|| a.size.cmp(&b.size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontStore;

    fn name(cpi: &str, codepage: &str) -> SourceName {
        SourceName {
            cpi_name: cpi.into(),
            codepage: codepage.into(),
            size: 16,
            padded: false,
        }
    }

    #[test]
    fn test_parse_source_name() {
        assert_eq!(
            SourceName::parse("ega.cpx_cp437_08.hex"),
            Some(SourceName {
                cpi_name: "ega.cpx".into(),
                codepage: "cp437".into(),
                size: 8,
                padded: false,
            })
        );
        assert_eq!(
            SourceName::parse("ega10.cpx_cp58152_16.hext").map(|n| (n.size, n.padded)),
            Some((16, true))
        );
        assert_eq!(SourceName::parse("base_16.hex"), None);
        assert_eq!(SourceName::parse("ega.cpx_cp437_xx.hex"), None);
        assert_eq!(SourceName::parse("ega.cpx_cp437_08.yaff"), None);
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hexfont-collection-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_padded_and_unpadded_sources() {
        let dir = scratch_dir("padded");
        let blank_8 = "00".repeat(8);
        fs::write(
            dir.join("ega.cpx_cp437_08.hext"),
            format!("0041:00183C66C3FFC3C3{}\n", blank_8),
        )
        .unwrap();
        fs::write(
            dir.join("ega.cpx_cp437_14.hext"),
            format!("0041:{}\n", "18".repeat(16)),
        )
        .unwrap();
        fs::write(dir.join("ega.cpx_cp850_08.hex"), "0041:00183C66C3FFC3C3\n").unwrap();

        let cpi_names = vec!["ega.cpx".to_string()];
        let collection = SourceCollection::load(&dir, &cpi_names, &[8, 14], 16).unwrap();
        assert_eq!(collection.len(), 3);

        for source in collection.fonts(8) {
            let glyph = source.font.get_glyph(0x41).unwrap();
            assert_eq!((glyph.width(), glyph.height()), (8, 16));
            assert_eq!(glyph.to_hex(), format!("00183C66C3FFC3C3{}", blank_8));
        }

        let glyph = collection.fonts(14)[0].font.get_glyph(0x41).unwrap();
        assert_eq!((glyph.width(), glyph.height()), (8, 16));
        assert_eq!(collection.fonts(14)[0].font.pixel_size(), 14);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_order() {
        let cpi_names = vec!["ega.cpx".to_string(), "ega2.cpx".to_string(), "ega10.cpx".to_string()];
        let mut names = vec![
            name("ega10.cpx", "cp437"),
            name("zzz.cpx", "cp437"),
            name("ega.cpx", "cp850"),
            name("ega2.cpx", "cp1116"),
            name("ega.cpx", "cp437"),
            name("ega2.cpx", "cp775"),
        ];
        names.sort_by(|a, b| load_order(&cpi_names, a, b));
        let order: Vec<_> = names
            .iter()
            .map(|n| format!("{}:{}", n.cpi_name, n.codepage))
            .collect();
        assert_eq!(
            order,
            vec![
                "ega.cpx:cp437",
                "ega.cpx:cp850",
                "ega2.cpx:cp775",
                "ega2.cpx:cp1116",
                "ega10.cpx:cp437",
                "zzz.cpx:cp437",
            ]
        );
    }

    #[test]
    fn test_matching() {
        let mut collection = SourceCollection::new();
        for (cpi, codepage) in [("ega.cpx", "cp437"), ("ega2.cpx", "cp437"), ("ega.cpx", "cp850")] {
            collection.insert(SourceFont {
                cpi_name: cpi.into(),
                codepage: codepage.into(),
                font: Font::new(8),
            });
        }

        let any = Selector::new("cp437", None);
        assert_eq!(collection.matching(8, &any).count(), 2);
        let pinned = Selector::new("cp437", Some("ega2.cpx".into()));
        let matched: Vec<_> = collection.matching(8, &pinned).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].cpi_name, "ega2.cpx");
        assert_eq!(collection.matching(16, &any).count(), 0);
        assert_eq!(collection.len(), 3);
    }
}
