use crate::chunk::ChunkType;
use crate::header::ColorType;
use std::collections::TryReserveError;
use std::error;
use std::fmt;
use std::io;

/// Every way a decode can fail.
///
/// All of them are fatal: the decoder stops at the first one and returns no pixels.
#[derive(Debug)]
pub enum Error {
    /// The 8-byte PNG signature differs at `index`.
    Signature { index: usize, expected: u8, actual: u8 },
    /// Input ended before the `IEND` chunk. `offset` is where the missing bytes were expected.
    TruncatedStream { offset: usize },
    /// Stored CRC doesn't match the CRC computed over the chunk type and payload.
    Checksum { chunk_index: usize, chunk_type: ChunkType, stored: u32, computed: u32 },
    /// The first chunk isn't `IHDR`.
    HeaderMissing { found: ChunkType },
    /// `IHDR` payload isn't 13 bytes long.
    HeaderLength { length: u32 },
    InvalidDimensions { width: u32, height: u32 },
    InvalidColorType(u8),
    InvalidBitDepth { bit_depth: u8, color_type: ColorType },
    UnsupportedCompression(u8),
    UnsupportedFilter(u8),
    InvalidInterlace(u8),
    /// Adam7 images are recognized, but not decoded.
    UnsupportedInterlace,
    /// `PLTE` payload length isn't a multiple of 3.
    PaletteLength(usize),
    /// More palette entries than the bit depth can address.
    PaletteOverflow { count: usize, max: usize },
    DuplicatePalette { chunk_index: usize },
    MissingPalette,
    PaletteIndex { index: u16, len: usize },
    NoImageData,
    UnknownFilter { filter_type: u8, row: usize },
    /// The concatenated `IDAT` data isn't a valid zlib stream.
    Decompression(io::Error),
    /// `width × height` is above the configured limit.
    ImageTooLarge { pixels: u64, max: u64 },
    /// The file couldn't be read.
    Io(io::Error),
    OutOfMemory,
}

impl Error {
    pub(crate) fn decompression(msg: &'static str) -> Self {
        Error::Decompression(io::Error::new(io::ErrorKind::InvalidData, msg))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Signature { index, expected, actual } => write!(f, "Incorrect PNG signature: byte {index} should be {expected} but was {actual}"),
            Error::TruncatedStream { offset } => write!(f, "No IEND chunk: data ends at byte {offset}"),
            Error::Checksum { chunk_index, chunk_type, stored, computed } => {
                write!(f, "Control sum doesn't match at chunk {chunk_index}, chunk type: {chunk_type} (stored {stored:08x}, computed {computed:08x})")
            },
            Error::HeaderMissing { found } => write!(f, "No IHDR chunk: the first chunk is {found}"),
            Error::HeaderLength { length } => write!(f, "Incorrect IHDR chunk length: {length}, should be 13"),
            Error::InvalidDimensions { width, height } => write!(f, "Incorrect dimensions: {width}x{height}"),
            Error::InvalidColorType(t) => write!(f, "Incorrect colour type: {t}"),
            Error::InvalidBitDepth { bit_depth, color_type } => {
                write!(f, "Incorrect bit depth or bit depth not matching the color type: {bit_depth} for {}", color_type.name())
            },
            Error::UnsupportedCompression(m) => write!(f, "Incorrect compression method: {m}"),
            Error::UnsupportedFilter(m) => write!(f, "Incorrect filter method: {m}"),
            Error::InvalidInterlace(m) => write!(f, "Incorrect interlace method: {m}"),
            Error::UnsupportedInterlace => f.write_str("Interlaced (Adam7) images are not supported"),
            Error::PaletteLength(len) => write!(f, "Incorrect palette chunk length: {len} is not a multiple of 3"),
            Error::PaletteOverflow { count, max } => write!(f, "Too many palette colors: {count}, at most {max} allowed"),
            Error::DuplicatePalette { chunk_index } => write!(f, "There should be only one palette chunk, found another at chunk {chunk_index}"),
            Error::MissingPalette => f.write_str("There should be a palette chunk for indexed image"),
            Error::PaletteIndex { index, len } => write!(f, "Palette index {index} out of range, palette has {len} colors"),
            Error::NoImageData => f.write_str("No IDAT chunks"),
            Error::UnknownFilter { filter_type, row } => write!(f, "Unknown filter: {filter_type} in row {row}"),
            Error::Decompression(err) => write!(f, "Corrupt image data stream: {err}"),
            Error::ImageTooLarge { pixels, max } => write!(f, "Image has {pixels} pixels, the limit is {max}"),
            Error::Io(err) => write!(f, "Can't read the file: {err}"),
            Error::OutOfMemory => f.write_str("Out of memory"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Decompression(err) | Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[doc(hidden)]
impl From<TryReserveError> for Error {
    #[cold]
    fn from(_: TryReserveError) -> Error {
        Error::OutOfMemory
    }
}
