//! The choices file names, for individual code points, the codepage font
//! whose glyph should win over all others.
//!
//! Each line reads `CODEPOINT:CODEPAGE` or `CODEPOINT:CODEPAGE:CPI_NAME`,
//! e.g. `0106:852:ega.cpx`. Without a CPI name, every CPI file carrying the
//! codepage qualifies.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ahash::RandomState;

#[derive(Debug, thiserror::Error)]
pub enum ChoicesError {
    #[error("Line {line}: expected CODEPOINT:CODEPAGE[:CPI]")]
    MissingCodepage { line: usize },
    #[error("Line {line}: invalid code point {text:?}")]
    InvalidCodepoint { line: usize, text: String },
    #[error("Failed to read choices file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Identifies the source fonts a group of choices applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Codepage name with its `cp` prefix, e.g. `cp852`.
    pub codepage: String,
    /// CPI file name, or `None` for any CPI.
    pub cpi: Option<String>,
}

impl Selector {
    pub fn new(codepage: impl Into<String>, cpi: Option<String>) -> Self {
        Self {
            codepage: codepage.into(),
            cpi,
        }
    }

    pub fn matches(&self, cpi_name: &str, codepage: &str) -> bool {
        self.codepage == codepage && self.cpi.as_deref().is_none_or(|cpi| cpi == cpi_name)
    }
}

/// Preferred code points grouped by selector, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choices {
    groups: Vec<(Selector, Vec<u32>)>,
}

impl Choices {
    pub fn parse(text: &str) -> Result<Self, ChoicesError> {
        let mut groups: Vec<(Selector, Vec<u32>)> = Vec::new();
        let mut index: HashMap<Selector, usize, RandomState> = HashMap::default();

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let raw = raw.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }

            let (code, rest) = raw
                .split_once(':')
                .ok_or(ChoicesError::MissingCodepage { line })?;
            let code = code.trim();
            let codepoint = u32::from_str_radix(code, 16)
                .ok()
                .filter(|_| !code.starts_with('+'))
                .ok_or_else(|| ChoicesError::InvalidCodepoint {
                    line,
                    text: code.to_string(),
                })?;

            let mut fields = rest.split(':').map(str::trim);
            let codepage = match fields.next() {
                Some(cp) if !cp.is_empty() => format!("cp{}", cp),
                _ => return Err(ChoicesError::MissingCodepage { line }),
            };
            let cpi = fields.next().filter(|s| !s.is_empty()).map(str::to_string);

            let selector = Selector::new(codepage, cpi);
            let slot = *index.entry(selector.clone()).or_insert_with(|| {
                groups.push((selector, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(codepoint);
        }

        Ok(Self { groups })
    }

    pub fn load(path: &Path) -> Result<Self, ChoicesError> {
        let text = fs::read_to_string(path).map_err(|source| ChoicesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&Selector, &[u32])> + '_ {
        self.groups
            .iter()
            .map(|(selector, codepoints)| (selector, codepoints.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, cps)| cps.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
