use crate::chunk::{check_signature, ChunkRef, IDAT, IEND, IHDR, PLTE, SIGNATURE};
use crate::header::Header;
use crate::iter::ChunksIterFallible;
use crate::Error;
use log::{debug, warn};

/// All chunks of a file up to `IEND`, with their CRCs verified and the header validated
#[derive(Debug)]
pub struct ChunkList<'a> {
    header: Header,
    /// index in file, chunk. `IHDR` included, `IEND` not.
    chunks: Vec<(usize, ChunkRef<'a>)>,
    header_count: usize,
    idat_count: usize,
}

impl<'a> ChunkList<'a> {
    /// Checks the signature, then reads chunks until `IEND`.
    ///
    /// The first chunk must be a valid `IHDR`, and is validated before anything else is read.
    /// Interlaced images are rejected at that point too.
    pub fn read(data: &'a [u8]) -> Result<Self, Error> {
        check_signature(data)?;
        let mut iter = ChunksIterFallible::new(&data[SIGNATURE.len()..], SIGNATURE.len());

        let (_, ihdr) = iter.next().ok_or(Error::TruncatedStream { offset: SIGNATURE.len() })??;
        if !ihdr.is_type(IHDR) {
            return Err(Error::HeaderMissing { found: ihdr.name() });
        }
        let header = Header::from_ihdr(ihdr.data())?;
        debug!("{}x{} {}-bit {}, interlace {:?}", header.width(), header.height(), header.bit_depth(), header.color_type().name(), header.interlace_method());
        header.check_supported()?;

        let mut list = Self {
            header,
            chunks: vec![(0, ihdr)],
            header_count: 1,
            idat_count: 0,
        };
        for item in iter {
            let (index, ch) = item?;
            match ch.name() {
                IEND => {
                    if !ch.is_empty() {
                        warn!("IEND chunk has {} bytes of data", ch.len());
                    }
                    return list.finish();
                },
                IDAT => list.idat_count += 1,
                PLTE => {},
                IHDR => {
                    warn!("ignoring IHDR chunk {index}");
                    list.header_count += 1;
                },
                name => warn!("ignoring {} chunk {index}{}", name, if ch.is_ancillary() { "" } else { " (critical)" }),
            }
            list.chunks.push((index, ch));
        }
        Err(Error::TruncatedStream { offset: data.len() })
    }

    fn finish(self) -> Result<Self, Error> {
        if self.idat_count == 0 {
            return Err(Error::NoImageData);
        }
        debug!("{} chunks, {} IDAT", self.chunk_count(), self.idat_count);
        Ok(self)
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Chunks in file order, excluding `IEND`
    pub fn chunks(&self) -> impl Iterator<Item = ChunkRef<'a>> + '_ {
        self.chunks.iter().map(|&(_, ch)| ch)
    }

    pub(crate) fn indexed_chunks(&self) -> &[(usize, ChunkRef<'a>)] {
        &self.chunks
    }

    /// Number of chunks including `IEND`
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len() + 1
    }

    #[inline]
    pub fn header_count(&self) -> usize {
        self.header_count
    }

    #[inline]
    pub fn idat_count(&self) -> usize {
        self.idat_count
    }

    /// Payloads of all `IDAT` chunks joined together, in file order
    pub fn idat_data(&self) -> Result<Vec<u8>, Error> {
        let idat = || self.chunks().filter(|ch| ch.is_type(IDAT));
        let mut out = Vec::new();
        out.try_reserve_exact(idat().map(|ch| ch.len()).sum())?;
        for ch in idat() {
            out.extend_from_slice(ch.data());
        }
        Ok(out)
    }
}
