use crate::chunk::ChunkRef;
use crate::Error;
use log::trace;

/// Walks the chunks after the signature, verifying each CRC before handing the chunk out.
///
/// Item is: index of the chunk in the file, the chunk.
/// After the first error the iterator is exhausted.
pub struct ChunksIterFallible<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) offset: usize,
    pub(crate) index: usize,
}

impl<'a> ChunksIterFallible<'a> {
    /// `data` starts right after the signature, at `offset` bytes into the file
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset, index: 0 }
    }
}

impl<'a> Iterator for ChunksIterFallible<'a> {
    type Item = Result<(usize, ChunkRef<'a>), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        let ch = match ChunkRef::new(self.data, self.offset) {
            Ok(ch) => ch,
            Err(e) => {
                self.data = &[];
                return Some(Err(e));
            },
        };
        let index = self.index;
        if !ch.check_crc() {
            self.data = &[];
            return Some(Err(Error::Checksum {
                chunk_index: index,
                chunk_type: ch.name(),
                stored: ch.crc(),
                computed: ch.computed_crc(),
            }));
        }
        trace!("chunk {} {} at {}, {} bytes", index, ch.name(), self.offset, ch.len());
        self.data = &self.data[ch.total_len()..];
        self.offset += ch.total_len();
        self.index += 1;
        Some(Ok((index, ch)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{IDAT, IEND};

    fn chunk(out: &mut Vec<u8>, name: &[u8; 4], payload: &[u8]) {
        let start = out.len();
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(payload);
        let crc = crc32fast::hash(&out[start + 4..]);
        out.extend_from_slice(&crc.to_be_bytes());
    }

    #[test]
    fn walks_chunks_in_order() {
        let mut data = Vec::new();
        chunk(&mut data, b"IDAT", &[1, 2]);
        chunk(&mut data, b"IDAT", &[3]);
        chunk(&mut data, b"IEND", &[]);
        let chunks: Vec<_> = ChunksIterFallible::new(&data, 8).map(|c| c.unwrap()).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].0, 0);
        assert!(chunks[1].1.is_type(IDAT));
        assert_eq!(chunks[1].1.data(), &[3]);
        assert!(chunks[2].1.is_type(IEND));
    }

    #[test]
    fn stops_after_bad_crc() {
        let mut data = Vec::new();
        chunk(&mut data, b"IDAT", &[1, 2]);
        chunk(&mut data, b"IDAT", &[3]);
        let last = data.len() - 5;
        data[last] ^= 0x10;
        let mut iter = ChunksIterFallible::new(&data, 8);
        assert!(iter.next().unwrap().is_ok());
        match iter.next() {
            Some(Err(Error::Checksum { chunk_index: 1, chunk_type, .. })) => assert_eq!(chunk_type, IDAT),
            other => panic!("{other:?}"),
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn reports_truncation_offset() {
        let mut data = Vec::new();
        chunk(&mut data, b"IDAT", &[1, 2]);
        data.extend_from_slice(&[0, 0, 0, 9, b'I']);
        let mut iter = ChunksIterFallible::new(&data, 8);
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(iter.next(), Some(Err(Error::TruncatedStream { offset: 27 }))));
    }
}
