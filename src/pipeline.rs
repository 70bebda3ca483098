use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ahash::RandomState;
use log::info;

use crate::choices::{Choices, ChoicesError};
use crate::collection::{CollectionError, SourceCollection};
use crate::compose::{ComposeError, ComposeStats, Composer};
use crate::config::BuildSettings;
use crate::font::Font;
use crate::hex::{self, HexError};
use crate::normalize::Normalizer;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Choices(#[from] ChoicesError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error(transparent)]
    Hex(#[from] HexError),
    #[error("{size} pixel font: {source}")]
    Compose {
        size: u32,
        #[source]
        source: ComposeError,
    },
    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No source fonts found in {}", .0.display())]
    NoSources(PathBuf),
}

/// A font written by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltFont {
    pub size: u32,
    pub path: PathBuf,
    pub glyphs: usize,
    pub composed: ComposeStats,
}

/// The batch build: merge codepage fonts by preference, drop the private use
/// area, fill in composed glyphs and write one HEX file per size.
pub struct Pipeline<N> {
    settings: BuildSettings,
    composer: Composer<N>,
}

impl<N: Normalizer> Pipeline<N> {
    pub fn new(settings: BuildSettings, normalizer: N) -> Self {
        Self {
            settings,
            composer: Composer::new(normalizer),
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn run(&self) -> Result<Vec<BuiltFont>, BuildError> {
        let settings = &self.settings;

        info!("Reading fonts from {}", settings.input_dir.display());
        let collection = SourceCollection::load(
            &settings.input_dir,
            &settings.cpi_names,
            &settings.sizes,
            settings.cell_height,
        )?;
        if collection.is_empty() {
            return Err(BuildError::NoSources(settings.input_dir.clone()));
        }
        info!("Loaded {} codepage fonts", collection.len());

        info!("Processing choices");
        let choices = Choices::load(&settings.choices)?;

        let merged = self.merge(&collection, &choices);

        fs::create_dir_all(&settings.output_dir).map_err(|source| BuildError::OutputDir {
            path: settings.output_dir.clone(),
            source,
        })?;

        info!("Writing output");
        let mut built = Vec::with_capacity(merged.len());
        for (size, font) in merged {
            if font.is_empty() {
                log::warn!("No glyphs for size {}, skipping", size);
                continue;
            }
            let (font, composed) = self
                .finish(&font)
                .map_err(|source| BuildError::Compose { size, source })?;
            let path = output_path(&settings.output_dir, size);
            hex::save(&font, &path)?;
            info!("Wrote {} glyphs to {}", font.len(), path.display());
            built.push(BuiltFont {
                size,
                path,
                glyphs: font.len(),
                composed,
            });
        }
        Ok(built)
    }

    /// Merges the source fonts of every size: first the preferred glyphs
    /// named in `choices`, then everything else in load order. A code point
    /// keeps the first glyph merged for it.
    pub fn merge(&self, collection: &SourceCollection, choices: &Choices) -> BTreeMap<u32, Font> {
        let mut merged = BTreeMap::new();
        for size in collection.sizes() {
            info!("Merging choices for size {}", size);
            let mut font = Font::new(size);
            for (selector, codepoints) in choices.groups() {
                let wanted: HashSet<u32, RandomState> = codepoints.iter().copied().collect();
                for source in collection.matching(size, selector) {
                    font = font.merged_with(&source.font.subset(&wanted));
                }
            }

            info!("Merging remaining fonts for size {}", size);
            for source in collection.fonts(size) {
                font = font.merged_with(&source.font);
            }
            merged.insert(size, font);
        }
        merged
    }

    /// Removes the private use area, then composes missing glyphs if enabled.
    pub fn finish(&self, font: &Font) -> Result<(Font, ComposeStats), ComposeError> {
        info!("Removing private use code points");
        let font = font.without(self.settings.pua_start..=self.settings.pua_end);
        if !self.settings.compose {
            return Ok((font, ComposeStats::default()));
        }

        info!("Composing missing glyphs");
        let (font, stats) = self.composer.compose(&font)?;
        info!(
            "Added {} aliased and {} composed glyphs",
            stats.aliased, stats.synthesized
        );
        Ok((font, stats))
    }
}

/// Reads one HEX file, fills in composed glyphs and writes the result.
pub fn compose_file<N: Normalizer>(
    input: &Path,
    output: &Path,
    height: u32,
    normalizer: N,
) -> Result<ComposeStats, BuildError> {
    let font = hex::load(input, height, height)?;
    info!("Read {} glyphs from {}", font.len(), input.display());
    let (font, stats) = Composer::new(normalizer)
        .compose(&font)
        .map_err(|source| BuildError::Compose {
            size: height,
            source,
        })?;
    hex::save(&font, output)?;
    info!(
        "Wrote {} glyphs to {} ({} added)",
        font.len(),
        output.display(),
        stats.total()
    );
    Ok(stats)
}

pub fn output_path(dir: &Path, size: u32) -> PathBuf {
    dir.join(format!("base_{:02}.hex", size))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::collection::SourceFont;
    use crate::font::{Bitmap, FontStore};
    use crate::normalize::TableNormalizer;

    fn source(cpi: &str, codepage: &str, glyphs: &[(u32, u32)]) -> SourceFont {
        let mut font = Font::new(8);
        for &(cp, row) in glyphs {
            font.insert(cp, Arc::new(Bitmap::from_rows(8, vec![row]).unwrap()))
                .unwrap();
        }
        SourceFont {
            cpi_name: cpi.into(),
            codepage: codepage.into(),
            font,
        }
    }

    fn row(font: &Font, cp: u32) -> u32 {
        font.get_glyph(cp).unwrap().rows()[0]
    }

    #[test]
    fn test_merge_prefers_choices() {
        let mut collection = SourceCollection::new();
        collection.insert(source("ega.cpx", "cp437", &[(0x41, 1), (0xC7, 1)]));
        collection.insert(source("ega.cpx", "cp850", &[(0xC7, 2), (0xD0, 2)]));
        collection.insert(source("ega2.cpx", "cp850", &[(0xC7, 3), (0x41, 3)]));

        let choices = Choices::parse("00C7:850:ega2.cpx\n0041:850\n").unwrap();
        let pipeline = Pipeline::new(BuildSettings::default(), TableNormalizer::new());
        let merged = pipeline.merge(&collection, &choices);
        let font = &merged[&8];

        assert_eq!(row(font, 0xC7), 3);
        // cp850 on any CPI: ega.cpx has no U+0041, ega2.cpx does
        assert_eq!(row(font, 0x41), 3);
        assert_eq!(row(font, 0xD0), 2);
        assert_eq!(font.len(), 3);
    }

    #[test]
    fn test_merge_without_choices_keeps_load_order() {
        let mut collection = SourceCollection::new();
        collection.insert(source("ega.cpx", "cp437", &[(0x41, 1)]));
        collection.insert(source("ega.cpx", "cp850", &[(0x41, 2), (0x42, 2)]));

        let pipeline = Pipeline::new(BuildSettings::default(), TableNormalizer::new());
        let merged = pipeline.merge(&collection, &Choices::default());
        assert_eq!(row(&merged[&8], 0x41), 1);
        assert_eq!(row(&merged[&8], 0x42), 2);
    }

    #[test]
    fn test_finish_strips_pua_and_composes() {
        let font = source("ega.cpx", "cp437", &[(0x1, 0x01), (0x2, 0x02), (0xE000, 0xFF), (0xF8FF, 0xFF)]).font;
        let normalizer = TableNormalizer::new()
            .with_decomposition(0x10, [0x1, 0x2])
            .with_decomposition(0x11, [0x1, 0xE000]);
        let pipeline = Pipeline::new(BuildSettings::default(), normalizer);

        let (finished, stats) = pipeline.finish(&font).unwrap();
        assert!(!finished.contains(0xE000));
        assert!(!finished.contains(0xF8FF));
        assert_eq!(row(&finished, 0x10), 0x03);
        assert!(!finished.contains(0x11));
        assert_eq!(stats.synthesized, 1);
    }

    #[test]
    fn test_finish_without_compose() {
        let font = source("ega.cpx", "cp437", &[(0x1, 0x01), (0x2, 0x02)]).font;
        let settings = BuildSettings {
            compose: false,
            ..Default::default()
        };
        let normalizer = TableNormalizer::new().with_decomposition(0x10, [0x1, 0x2]);
        let (finished, stats) = Pipeline::new(settings, normalizer).finish(&font).unwrap();
        assert_eq!(finished, font);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path(Path::new("out"), 8), PathBuf::from("out/base_08.hex"));
        assert_eq!(output_path(Path::new("out"), 16), PathBuf::from("out/base_16.hex"));
    }
}
