/// Last code point visited by the composer (top of Plane 0).
pub const PLANE0_LAST: u32 = 0xFFFF;

// Private use area stripped from the final fonts
pub const PUA_START: u32 = 0xE000;
pub const PUA_END: u32 = 0xF8FF;

/// Row count of the output HEX cells. Shorter fonts are padded at the bottom.
pub const DEFAULT_CELL_HEIGHT: u32 = 16;

pub const DEFAULT_SIZES: [u32; 3] = [8, 14, 16];

pub const DEFAULT_CHOICES_FILE: &str = "choices";
pub const DEFAULT_INPUT_DIR: &str = "hex";
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// CPI files of the CPIDOS collection, in the order they are merged.
pub fn default_cpi_names() -> Vec<String> {
    std::iter::once(String::from("ega.cpx"))
        .chain((2..=18).map(|i| format!("ega{}.cpx", i)))
        .collect()
}
