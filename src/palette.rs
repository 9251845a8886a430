use crate::chunk::{ChunkRef, PLTE};
use crate::header::{ColorType, Header};
use crate::Error;
use log::warn;
use rgb::RGB8;

/// Colors of an indexed image, from the `PLTE` chunk
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    entries: Vec<RGB8>,
}

impl Palette {
    /// Reads the `PLTE` payload. An image of `bit_depth` can't address more than `2^bit_depth` colors.
    pub fn from_plte(data: &[u8], bit_depth: u8) -> Result<Self, Error> {
        if data.len() % 3 != 0 {
            return Err(Error::PaletteLength(data.len()));
        }
        let count = data.len() / 3;
        let max = 1usize << bit_depth;
        if count > max {
            return Err(Error::PaletteOverflow { count, max });
        }
        let entries = data.chunks_exact(3).map(|c| RGB8::new(c[0], c[1], c[2])).collect();
        Ok(Self { entries })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[RGB8] {
        &self.entries
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<RGB8> {
        self.entries.get(index).copied()
    }

    /// Like `get`, but an index past the end is an error
    #[inline]
    pub fn lookup(&self, index: u16) -> Result<RGB8, Error> {
        self.get(index.into()).ok_or(Error::PaletteIndex { index, len: self.entries.len() })
    }
}

/// Finds the single `PLTE` chunk, if any.
///
/// Indexed images must have one. Other color types may have one, but it's not used.
pub(crate) fn read_palette(chunks: &[(usize, ChunkRef<'_>)], header: &Header) -> Result<Option<Palette>, Error> {
    let mut palette = None;
    for &(chunk_index, ch) in chunks.iter().filter(|(_, ch)| ch.is_type(PLTE)) {
        if palette.is_some() {
            return Err(Error::DuplicatePalette { chunk_index });
        }
        palette = Some(Palette::from_plte(ch.data(), header.bit_depth())?);
    }
    match (header.color_type(), &palette) {
        (ColorType::Indexed, None) => return Err(Error::MissingPalette),
        (ColorType::Indexed, Some(_)) | (_, None) => {},
        (ct, Some(_)) => warn!("ignoring PLTE chunk in a {} image", ct.name()),
    }
    Ok(palette)
}
