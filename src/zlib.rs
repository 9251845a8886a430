use crate::Error;
use flate2::{Decompress, FlushDecompress, Status};
use std::io;

/// Largest expansion a deflate stream can achieve, used to cap the output preallocation
const MAX_DEFLATE_RATIO: usize = 1032;

fn check_zlib_stream(inp: &[u8]) -> Result<(), Error> {
    if inp.len() < 2 {
        return Err(Error::decompression("zlib stream is too short"));
    }
    /*read information from zlib header*/
    if (u32::from(inp[0]) * 256 + u32::from(inp[1])) % 31 != 0 {
        /*256 * in[0] + in[1] must be a multiple of 31, the FCHECK value is supposed to be made that way*/
        return Err(Error::decompression("zlib header check bits are wrong"));
    }
    let cm = u32::from(inp[0]) & 15;
    let cinfo = (u32::from(inp[0]) >> 4) & 15;
    let fdict = (u32::from(inp[1]) >> 5) & 1;
    if cm != 8 || cinfo > 7 {
        /*only compression method 8: inflate with sliding window of 32k is allowed in PNG*/
        return Err(Error::decompression("zlib compression method is not deflate"));
    }
    if fdict != 0 {
        /*"The additional flags shall not specify a preset dictionary."*/
        return Err(Error::decompression("zlib stream requires a preset dictionary"));
    }
    Ok(())
}

/// Inflates the concatenated `IDAT` payload.
///
/// `expected_size` is only a hint for preallocation. Data after the end of the zlib stream is ignored.
#[inline(never)]
pub(crate) fn decompress(inp: &[u8], expected_size: usize) -> Result<Vec<u8>, Error> {
    check_zlib_stream(inp)?;
    let mut out = Vec::new();
    out.try_reserve(expected_size.min(inp.len().saturating_mul(MAX_DEFLATE_RATIO)).max(16 * 1024))?;

    let mut dec = Decompress::new(true);
    loop {
        let consumed = dec.total_in() as usize;
        let last_total_out = dec.total_out();
        let status = dec.decompress_vec(&inp[consumed..], &mut out, FlushDecompress::None)
            .map_err(|e| Error::Decompression(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let progressed = dec.total_in() as usize != consumed || dec.total_out() != last_total_out;
                if out.len() == out.capacity() {
                    out.try_reserve(out.capacity())?;
                } else if !progressed {
                    return Err(Error::decompression("zlib stream is truncated"));
                }
            },
        }
    }
    Ok(out)
}
