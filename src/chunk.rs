use crate::Error;
use std::fmt;

/// 8 bytes PNG signature, aka the magic bytes
pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Four-letter chunk name, e.g. `IHDR`
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

pub const IHDR: ChunkType = ChunkType(*b"IHDR");
pub const PLTE: ChunkType = ChunkType(*b"PLTE");
pub const IDAT: ChunkType = ChunkType(*b"IDAT");
pub const IEND: ChunkType = ChunkType(*b"IEND");

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &c in &self.0 {
            if c.is_ascii_graphic() {
                write!(f, "{}", c as char)?;
            } else {
                write!(f, "\\x{c:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ChunkType({self})")
    }
}

/// Compares the start of the file with the PNG signature.
///
/// Input shorter than the signature, but matching as far as it goes, is a truncated stream.
pub fn check_signature(data: &[u8]) -> Result<(), Error> {
    for (index, (&expected, &actual)) in SIGNATURE.iter().zip(data).enumerate() {
        if expected != actual {
            return Err(Error::Signature { index, expected, actual });
        }
    }
    if data.len() < SIGNATURE.len() {
        return Err(Error::TruncatedStream { offset: data.len() });
    }
    Ok(())
}

/// Reference to a chunk inside the file, from its length field to its CRC inclusive
#[derive(Copy, Clone)]
pub struct ChunkRef<'a> {
    data: &'a [u8],
}

impl<'a> ChunkRef<'a> {
    /// `data` starts at the chunk's length field. `offset` is only used for error reporting.
    pub(crate) fn new(data: &'a [u8], offset: usize) -> Result<Self, Error> {
        if data.len() < 12 {
            return Err(Error::TruncatedStream { offset: offset + data.len() });
        }
        let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        let total = len.checked_add(12).filter(|&total| total <= data.len())
            .ok_or(Error::TruncatedStream { offset: offset + data.len() })?;
        Ok(Self { data: &data[..total] })
    }

    /// Length of the payload
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - 12
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the whole chunk including length, type and CRC fields
    #[inline]
    pub(crate) fn total_len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn name(&self) -> ChunkType {
        ChunkType([self.data[4], self.data[5], self.data[6], self.data[7]])
    }

    #[inline]
    pub fn is_type(&self, name: ChunkType) -> bool {
        self.name() == name
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        &self.data[8..8 + self.len()]
    }

    /// The CRC stored in the file
    pub fn crc(&self) -> u32 {
        let at = 8 + self.len();
        u32::from_be_bytes([self.data[at], self.data[at + 1], self.data[at + 2], self.data[at + 3]])
    }

    /// The CRC is taken of the chunk type and the payload, not the length
    pub fn computed_crc(&self) -> u32 {
        crc32fast::hash(&self.data[4..8 + self.len()])
    }

    pub fn check_crc(&self) -> bool {
        self.crc() == self.computed_crc()
    }

    pub fn is_ancillary(&self) -> bool {
        (self.data[4] & 32) != 0
    }

    pub fn is_private(&self) -> bool {
        (self.data[6] & 32) != 0
    }

    pub fn is_safe_to_copy(&self) -> bool {
        (self.data[7] & 32) != 0
    }
}

impl fmt::Debug for ChunkRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ChunkRef").field("name", &self.name()).field("len", &self.len()).finish()
    }
}
