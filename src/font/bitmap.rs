use std::fmt;

/// Widest glyph a row word can hold.
pub const MAX_WIDTH: u32 = 32;

/// A fixed-size monochrome glyph bitmap.
///
/// Rows are stored top to bottom. Each row word holds `width` pixels in its
/// low bits, with the most significant of those bits being the leftmost
/// pixel, which is exactly the layout of a HEX row.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Bitmap {
    width: u32,
    height: u32,
    rows: Vec<u32>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BitmapError {
    #[error("Cannot superimpose {left_width}x{left_height} and {right_width}x{right_height} glyphs")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },
    #[error("Invalid hex digits: {0:?}")]
    InvalidHex(String),
    #[error("{digits} hex digits do not form rows of a {height} pixel high glyph")]
    BadLength { digits: usize, height: u32 },
    #[error("Glyph width {0} is not a multiple of 8 up to 32")]
    BadWidth(u32),
}

impl Bitmap {
    /// Creates a blank bitmap.
    pub fn blank(width: u32, height: u32) -> Result<Self, BitmapError> {
        check_width(width)?;
        Ok(Self {
            width,
            height,
            rows: vec![0; height as usize],
        })
    }

    /// Creates a bitmap from row words. The height is the number of rows.
    /// Bits beyond `width` are masked off.
    pub fn from_rows(width: u32, rows: Vec<u32>) -> Result<Self, BitmapError> {
        check_width(width)?;
        let mask = row_mask(width);
        let rows = rows.into_iter().map(|row| row & mask).collect::<Vec<_>>();
        Ok(Self {
            width,
            height: rows.len() as u32,
            rows,
        })
    }

    /// Decodes HEX glyph digits for a glyph of the given height.
    ///
    /// The width follows from the digit count: `digits * 4 / height`.
    pub fn from_hex(digits: &str, height: u32) -> Result<Self, BitmapError> {
        let len = digits.len();
        if height == 0 || len == 0 || (len * 4) % height as usize != 0 {
            return Err(BitmapError::BadLength {
                digits: len,
                height,
            });
        }
        let width = (len * 4 / height as usize) as u32;
        check_width(width)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BitmapError::InvalidHex(digits.to_string()));
        }

        let per_row = (width / 4) as usize;
        let rows = (0..height as usize)
            .map(|row| {
                let chunk = &digits[row * per_row..(row + 1) * per_row];
                u32::from_str_radix(chunk, 16)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| BitmapError::InvalidHex(digits.to_string()))?;

        Ok(Self {
            width,
            height,
            rows,
        })
    }

    /// Encodes the bitmap as uppercase HEX glyph digits.
    pub fn to_hex(&self) -> String {
        let per_row = (self.width / 4) as usize;
        self.rows
            .iter()
            .map(|row| format!("{:0width$X}", row, width = per_row))
            .collect()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    /// Returns whether the pixel at (x, y) is set. Out of range is unset.
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        (self.rows[y as usize] >> (self.width - 1 - x)) & 1 != 0
    }

    /// Returns true if no pixel is set.
    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|&row| row == 0)
    }

    /// Overlays two equal-size bitmaps, setting every pixel set in either.
    pub fn superimpose(&self, other: &Bitmap) -> Result<Bitmap, BitmapError> {
        if self.width != other.width || self.height != other.height {
            return Err(BitmapError::DimensionMismatch {
                left_width: self.width,
                left_height: self.height,
                right_width: other.width,
                right_height: other.height,
            });
        }
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(a, b)| a | b)
            .collect();
        Ok(Bitmap {
            width: self.width,
            height: self.height,
            rows,
        })
    }

    /// Overlays a sequence of layers. Returns `None` for an empty sequence.
    pub fn superimpose_all<'a, I>(layers: I) -> Result<Option<Bitmap>, BitmapError>
    where
        I: IntoIterator<Item = &'a Bitmap>,
    {
        let mut layers = layers.into_iter();
        let Some(first) = layers.next() else {
            return Ok(None);
        };
        layers
            .try_fold(first.clone(), |acc, layer| acc.superimpose(layer))
            .map(Some)
    }

    /// Returns a copy with `bottom` blank rows appended.
    pub fn expand(&self, bottom: u32) -> Bitmap {
        let mut rows = self.rows.clone();
        rows.resize((self.height + bottom) as usize, 0);
        Bitmap {
            width: self.width,
            height: self.height + bottom,
            rows,
        }
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({}x{}", self.width, self.height)?;
        for y in 0..self.height {
            f.write_str("\n  ")?;
            for x in 0..self.width {
                f.write_str(if self.pixel(x, y) { "#" } else { "." })?;
            }
        }
        f.write_str(")")
    }
}

fn check_width(width: u32) -> Result<(), BitmapError> {
    if width == 0 || width % 8 != 0 || width > MAX_WIDTH {
        return Err(BitmapError::BadWidth(width));
    }
    Ok(())
}

fn row_mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}
