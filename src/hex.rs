//! Reading and writing HEX bitmap font files.
//!
//! A HEX file holds one glyph per line as `CODE:DIGITS`, where `CODE` is the
//! code point in hexadecimal and `DIGITS` are the glyph rows, top to bottom,
//! each row taking `width / 4` digits. The glyph height is not stored in the
//! file, so callers pass it in and the width follows from the digit count.
//! Lines starting with `#` are comments.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::font::{Bitmap, BitmapError, Font};

const MAX_CODEPOINT: u32 = 0x10FFFF;

#[derive(Debug, thiserror::Error)]
pub enum HexError {
    #[error("Line {line}: missing ':' separator")]
    MissingSeparator { line: usize },
    #[error("Line {line}: invalid code point {text:?}")]
    InvalidCodepoint { line: usize, text: String },
    #[error("Line {line}: {source}")]
    Glyph {
        line: usize,
        #[source]
        source: BitmapError,
    },
    #[error("Line {line}: duplicate glyph for U+{codepoint:04X}")]
    Duplicate { line: usize, codepoint: u32 },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<HexError>,
    },
}

/// Parses HEX text into a font whose glyphs are `height` rows high.
pub fn parse(text: &str, pixel_size: u32, height: u32) -> Result<Font, HexError> {
    let mut font = Font::new(pixel_size);

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let raw = raw.trim_end();
        if raw.is_empty() {
            continue;
        }
        if let Some(comment) = raw.strip_prefix('#') {
            font.push_comment(comment.strip_prefix(' ').unwrap_or(comment));
            continue;
        }

        let (code, digits) = raw
            .split_once(':')
            .ok_or(HexError::MissingSeparator { line })?;
        let codepoint = parse_codepoint(code.trim()).ok_or_else(|| HexError::InvalidCodepoint {
            line,
            text: code.to_string(),
        })?;
        let bitmap = Bitmap::from_hex(digits.trim(), height)
            .map_err(|source| HexError::Glyph { line, source })?;

        if font.insert(codepoint, Arc::new(bitmap)).is_err() {
            return Err(HexError::Duplicate { line, codepoint });
        }
    }

    Ok(font)
}

/// Formats a font as HEX text, comments first, glyphs by ascending code point.
pub fn format(font: &Font) -> String {
    let mut out = String::new();
    for comment in font.comments() {
        if comment.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str(&format!("# {}\n", comment));
        }
    }
    for (codepoint, glyph) in font.iter() {
        out.push_str(&format!("{:04X}:{}\n", codepoint, glyph.to_hex()));
    }
    out
}

/// Reads a HEX file from disk.
pub fn load(path: &Path, pixel_size: u32, height: u32) -> Result<Font, HexError> {
    let text = fs::read_to_string(path).map_err(|source| HexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, pixel_size, height).map_err(|source| HexError::File {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

/// Writes a font to disk as a HEX file.
pub fn save(font: &Font, path: &Path) -> Result<(), HexError> {
    fs::write(path, format(font)).map_err(|source| HexError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_codepoint(text: &str) -> Option<u32> {
    let text = text
        .strip_prefix("U+")
        .or_else(|| text.strip_prefix("u+"))
        .unwrap_or(text);
    if !(4..=6).contains(&text.len()) || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(text, 16)
        .ok()
        .filter(|&cp| cp <= MAX_CODEPOINT)
}
