//! Decoder for PNG files, giving rows of RGB or RGBA pixels.
//!
//! Every chunk's CRC is checked, the header is validated before anything else is read,
//! and every malformed or unsupported file fails with a specific [`Error`].
//! Interlaced (Adam7) images are recognized, but not decoded.
//!
//! ```no_run
//! let png = pngread::decode_file("image.png")?;
//! println!("{}x{}", png.info.header.width(), png.info.header.height());
//! # Ok::<(), pngread::Error>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod chunk;
mod error;
mod filter;
mod header;
mod image;
mod iter;
mod palette;
mod pixels;
mod stream;
mod zlib;

pub use crate::chunk::{ChunkRef, ChunkType, SIGNATURE};
pub use crate::error::Error;
pub use crate::filter::{FilterType, Scanlines};
pub use crate::header::{ColorType, Header, InterlaceMethod};
pub use crate::image::{Bitmap, Image, Row};
pub use crate::iter::ChunksIterFallible;
pub use crate::palette::Palette;
pub use crate::stream::ChunkList;
pub use rgb::{RGB16, RGB8, RGBA16};

use crate::palette::read_palette;
use crate::pixels::ColorConverter;
use log::debug;
use std::fs;
use std::path::Path;

/// Limits and checks applied while decoding
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecoderSettings {
    /// Refuse images with more pixels than this. `None` for no limit.
    pub max_pixels: Option<u64>,
    /// Require the decompressed data to be exactly `height` rows long.
    /// When off, missing rows are left out and extra data is ignored.
    pub strict_size: bool,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            max_pixels: Some(268_435_455),
            strict_size: false,
        }
    }
}

/// What's known about the file before decoding the pixels
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Info {
    pub header: Header,
    /// Present in all indexed images, may be present in others
    pub palette: Option<Palette>,
    /// All chunks, including `IHDR` and `IEND`
    pub chunk_count: usize,
    pub idat_count: usize,
}

/// A decoded file
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Png {
    pub info: Info,
    pub image: Image,
}

#[derive(Clone, Debug, Default)]
pub struct Decoder {
    settings: DecoderSettings,
}

impl Decoder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_settings(settings: DecoderSettings) -> Self {
        Self { settings }
    }

    #[inline]
    pub fn settings(&self) -> &DecoderSettings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut DecoderSettings {
        &mut self.settings
    }

    fn read_info<'a>(&self, data: &'a [u8]) -> Result<(Info, ChunkList<'a>), Error> {
        let chunks = ChunkList::read(data)?;
        let header = *chunks.header();
        if let Some(max) = self.settings.max_pixels {
            if header.pixels() > max {
                return Err(Error::ImageTooLarge { pixels: header.pixels(), max });
            }
        }
        let palette = read_palette(chunks.indexed_chunks(), &header)?;
        let info = Info {
            header,
            palette,
            chunk_count: chunks.chunk_count(),
            idat_count: chunks.idat_count(),
        };
        Ok((info, chunks))
    }

    /// Reads and checks all chunks, the header and the palette, but doesn't decompress the image data
    pub fn inspect(&self, data: &[u8]) -> Result<Info, Error> {
        self.read_info(data).map(|(info, _)| info)
    }

    /// Decompresses the image and returns an iterator decoding it row by row
    pub fn reader(&self, data: &[u8]) -> Result<Reader, Error> {
        let (info, chunks) = self.read_info(data)?;
        let header = info.header;
        let converter = ColorConverter::new(&header, info.palette.as_ref())?;
        let too_large = || Error::ImageTooLarge { pixels: header.pixels(), max: usize::MAX as u64 };

        let row_bytes = usize::try_from(header.row_bytes()).map_err(|_| too_large())?;
        let expected_size = (header.row_bytes() + 1).checked_mul(u64::from(header.height()))
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(too_large)?;

        let idat = chunks.idat_data()?;
        let scanlines = zlib::decompress(&idat, expected_size)?;
        debug!("{} bytes of image data inflated to {}, expected {}", idat.len(), scanlines.len(), expected_size);
        if self.settings.strict_size && scanlines.len() != expected_size {
            return Err(Error::decompression("decompressed size doesn't match the image size"));
        }

        let lines = Scanlines::new(scanlines, row_bytes, header.filter_unit(), header.height() as usize)?;
        Ok(Reader { info, lines, converter, failed: false })
    }

    /// Decodes the whole image
    pub fn decode(&self, data: impl AsRef<[u8]>) -> Result<Png, Error> {
        let mut reader = self.reader(data.as_ref())?;
        let header = reader.info.header;
        let mut image = Image::new(header.width() as usize, header.color_type().has_alpha());

        #[cfg(not(feature = "rayon"))]
        for row in &mut reader {
            image.push_row(row?);
        }

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            let mut lines = Vec::new();
            let mut unfilter_error = None;
            for line in reader.lines.by_ref() {
                match line {
                    Ok(line) => lines.push(line),
                    Err(err) => unfilter_error = Some(err),
                }
            }
            let converter = &reader.converter;
            let rows: Vec<Result<Row, Error>> = lines.par_iter().map(|line| converter.convert_row(line)).collect();
            // rows that failed to convert come before the row that failed to unfilter
            for row in rows {
                image.push_row(row?);
            }
            if let Some(err) = unfilter_error {
                return Err(err);
            }
        }

        if image.height() != header.height() as usize {
            debug!("decoded {} of {} rows", image.height(), header.height());
        }
        Ok(Png { info: reader.info, image })
    }

    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<Png, Error> {
        self.decode(fs::read(path)?)
    }
}

/// Rows of a file, decoded lazily
pub struct Reader {
    info: Info,
    lines: Scanlines,
    converter: ColorConverter,
    failed: bool,
}

impl Reader {
    #[inline]
    pub fn info(&self) -> &Info {
        &self.info
    }
}

impl Iterator for Reader {
    type Item = Result<Row, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let res = self.lines.next()?.and_then(|line| self.converter.convert_row(&line));
        self.failed = res.is_err();
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed { (0, Some(0)) } else { self.lines.size_hint() }
    }
}

/// Decodes a PNG file in memory with the default settings
pub fn decode_memory(data: impl AsRef<[u8]>) -> Result<Png, Error> {
    Decoder::new().decode(data)
}

/// Loads and decodes a PNG file with the default settings
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Png, Error> {
    Decoder::new().decode_file(path)
}
