use crate::header::{ColorType, Header};
use crate::image::Row;
use crate::palette::Palette;
use crate::Error;
use rgb::{RGB16, RGBA16};

/// Splits a reconstructed scanline into samples.
///
/// 8-bit samples are bytes, 16-bit ones big-endian byte pairs, and smaller ones are packed
/// most significant bits first.
pub(crate) fn unpack_samples(row: &[u8], bit_depth: u8, out: &mut Vec<u16>) {
    match bit_depth {
        8 => out.extend(row.iter().map(|&b| u16::from(b))),
        16 => out.extend(row.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]))),
        _ => {
            let mask = (1u8 << bit_depth) - 1;
            let per_byte = 8 / bit_depth;
            for &byte in row {
                out.extend((0..per_byte).rev().map(|k| u16::from((byte >> (k * bit_depth)) & mask)));
            }
        },
    }
}

/// Intensity of a grayscale sample.
///
/// 1-bit is black or white. 2 and 4-bit samples keep 0 and 255 at the extremes and are
/// multiplied by `256 / max` in between. 8 and 16-bit samples are used as they are.
#[inline]
pub(crate) fn gray_level(sample: u16, bit_depth: u8) -> u16 {
    match bit_depth {
        1 => if sample != 0 { 255 } else { 0 },
        2 | 4 => {
            let max = (1u16 << bit_depth) - 1;
            if sample == 0 {
                0
            } else if sample == max {
                255
            } else {
                sample * (256 / max)
            }
        },
        _ => sample,
    }
}

/// Turns reconstructed scanlines into rows of RGB or RGBA pixels
pub(crate) struct ColorConverter {
    header: Header,
    /// Only kept for indexed images
    palette: Option<Palette>,
}

impl ColorConverter {
    pub fn new(header: &Header, palette: Option<&Palette>) -> Result<Self, Error> {
        let palette = match header.color_type() {
            ColorType::Indexed => Some(palette.ok_or(Error::MissingPalette)?.clone()),
            _ => None,
        };
        Ok(Self { header: *header, palette })
    }

    pub fn convert_row(&self, scanline: &[u8]) -> Result<Row, Error> {
        let bit_depth = self.header.bit_depth();
        let channels = usize::from(self.header.channels());
        let width = self.header.width() as usize;

        let mut samples = Vec::new();
        samples.try_reserve_exact(scanline.len() * 8 / usize::from(bit_depth))?;
        unpack_samples(scanline, bit_depth, &mut samples);
        // padding bits at the end of sub-byte rows aren't pixels
        samples.truncate(width * channels);

        Ok(match self.header.color_type() {
            ColorType::Grayscale => Row::RGB(samples.iter().map(|&s| {
                let v = gray_level(s, bit_depth);
                RGB16::new(v, v, v)
            }).collect()),
            ColorType::Truecolor => Row::RGB(samples.chunks_exact(3).map(|c| RGB16::new(c[0], c[1], c[2])).collect()),
            ColorType::Indexed => {
                let palette = self.palette.as_ref().ok_or(Error::MissingPalette)?;
                Row::RGB(samples.iter().map(|&index| {
                    palette.lookup(index).map(|c| RGB16::new(c.r.into(), c.g.into(), c.b.into()))
                }).collect::<Result<_, _>>()?)
            },
            ColorType::GrayscaleAlpha => Row::RGBA(samples.chunks_exact(2).map(|c| RGBA16::new(c[0], c[0], c[0], c[1])).collect()),
            ColorType::TruecolorAlpha => Row::RGBA(samples.chunks_exact(4).map(|c| RGBA16::new(c[0], c[1], c[2], c[3])).collect()),
        })
    }
}
