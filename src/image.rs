use rgb::{RGB16, RGBA16};
use std::ops::Index;

/// One decoded row of pixels. Samples keep their bit depth, so 16-bit images have values up to 65535.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Row {
    RGB(Vec<RGB16>),
    RGBA(Vec<RGBA16>),
}

impl Row {
    pub fn len(&self) -> usize {
        match self {
            Row::RGB(px) => px.len(),
            Row::RGBA(px) => px.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pixels stored row after row
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bitmap<T> {
    /// Raw bitmap memory. Layout is row-major, `width * height` pixels.
    pub buffer: Vec<T>,
    pub width: usize,
    /// Number of rows actually decoded
    pub height: usize,
}

impl<T> Bitmap<T> {
    pub(crate) fn new(width: usize) -> Self {
        Self { buffer: Vec::new(), width, height: 0 }
    }

    pub(crate) fn push_row(&mut self, row: Vec<T>) {
        debug_assert_eq!(row.len(), self.width);
        self.buffer.extend(row);
        self.height += 1;
    }

    pub fn row(&self, y: usize) -> Option<&[T]> {
        self.buffer.get(y * self.width..(y + 1) * self.width)
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.buffer.chunks_exact(self.width)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width {
            return None;
        }
        self.buffer.get(y * self.width + x)
    }
}

/// `bitmap[y][x]`
impl<T> Index<usize> for Bitmap<T> {
    type Output = [T];

    fn index(&self, y: usize) -> &[T] {
        &self.buffer[y * self.width..(y + 1) * self.width]
    }
}

/// Decoded pixels. Images with an alpha channel are RGBA, all others RGB.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Image {
    RGB(Bitmap<RGB16>),
    RGBA(Bitmap<RGBA16>),
}

impl Image {
    pub(crate) fn new(width: usize, has_alpha: bool) -> Self {
        if has_alpha {
            Image::RGBA(Bitmap::new(width))
        } else {
            Image::RGB(Bitmap::new(width))
        }
    }

    pub(crate) fn push_row(&mut self, row: Row) {
        match (self, row) {
            (Image::RGB(bitmap), Row::RGB(px)) => bitmap.push_row(px),
            (Image::RGBA(bitmap), Row::RGBA(px)) => bitmap.push_row(px),
            _ => unreachable!("row type follows the color type"),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Image::RGB(bitmap) => bitmap.width,
            Image::RGBA(bitmap) => bitmap.width,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Image::RGB(bitmap) => bitmap.height,
            Image::RGBA(bitmap) => bitmap.height,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Image::RGBA(_))
    }

    /// Every pixel in row-major order, RGB pixels made opaque with the given alpha
    pub fn rgba_pixels(&self, opaque: u16) -> Vec<RGBA16> {
        match self {
            Image::RGB(bitmap) => bitmap.buffer.iter().map(|px| RGBA16::new(px.r, px.g, px.b, opaque)).collect(),
            Image::RGBA(bitmap) => bitmap.buffer.clone(),
        }
    }
}
