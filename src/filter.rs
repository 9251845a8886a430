use crate::Error;
use log::{debug, trace};

/// Per-scanline filter, stored in the first byte of every row
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    pub fn from_u8(n: u8) -> Option<Self> {
        Some(match n {
            0 => Self::None,
            1 => Self::Sub,
            2 => Self::Up,
            3 => Self::Average,
            4 => Self::Paeth,
            _ => return None,
        })
    }
}

/// Picks whichever of left, above and upper-left is closest to `a + b - c`.
/// Ties go to `a`, then `b`.
#[inline]
pub(crate) fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let (a16, b16, c16) = (i16::from(a), i16::from(b), i16::from(c));
    let p = a16 + b16 - c16;
    let pa = (p - a16).abs();
    let pb = (p - b16).abs();
    let pc = (p - c16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/*
  Undoes the filter of one scanline.
  precon is the previous unfiltered scanline (all zeros for the first row), recon the result,
  scanline the filtered bytes without the filter type byte.
  bytewidth is the distance to the byte of the previous pixel, 1 when pixels are smaller than a byte.
  */
pub(crate) fn unfilter_scanline(recon: &mut [u8], scanline: &[u8], precon: &[u8], bytewidth: usize, filter_type: FilterType) {
    let length = recon.len();
    debug_assert_eq!(length, scanline.len());
    debug_assert_eq!(length, precon.len());
    let bytewidth = bytewidth.min(length);

    match filter_type {
        FilterType::None => recon.copy_from_slice(scanline),
        FilterType::Sub => {
            recon[..bytewidth].copy_from_slice(&scanline[..bytewidth]);
            for i in bytewidth..length {
                recon[i] = scanline[i].wrapping_add(recon[i - bytewidth]);
            }
        },
        FilterType::Up => {
            for i in 0..length {
                recon[i] = scanline[i].wrapping_add(precon[i]);
            }
        },
        FilterType::Average => {
            for i in 0..bytewidth {
                recon[i] = scanline[i].wrapping_add(precon[i] >> 1);
            }
            for i in bytewidth..length {
                let t = u16::from(recon[i - bytewidth]) + u16::from(precon[i]);
                recon[i] = scanline[i].wrapping_add((t >> 1) as u8);
            }
        },
        FilterType::Paeth => {
            /*with a and c both 0 the predictor is always b*/
            for i in 0..bytewidth {
                recon[i] = scanline[i].wrapping_add(precon[i]);
            }
            for i in bytewidth..length {
                recon[i] = scanline[i].wrapping_add(paeth_predictor(recon[i - bytewidth], precon[i], precon[i - bytewidth]));
            }
        },
    }
}

/// Reconstructed scanlines of the decompressed image data, one row at a time.
///
/// Each row is `row_bytes` long, without the filter type byte. The rows depend on each other,
/// so the iterator can only go forward once. It ends after `max_rows` rows, when less than a whole
/// row of data is left, or after the first error.
pub struct Scanlines {
    data: Vec<u8>,
    pos: usize,
    row_bytes: usize,
    filter_unit: usize,
    prev: Vec<u8>,
    row: usize,
    max_rows: usize,
}

impl Scanlines {
    pub(crate) fn new(data: Vec<u8>, row_bytes: usize, filter_unit: usize, max_rows: usize) -> Result<Self, Error> {
        let mut prev = Vec::new();
        prev.try_reserve_exact(row_bytes)?;
        prev.resize(row_bytes, 0);
        Ok(Self { data, pos: 0, row_bytes, filter_unit, prev, row: 0, max_rows })
    }

    /// Number of rows left, assuming they all decode
    pub fn rows_remaining(&self) -> usize {
        let frames = (self.data.len() - self.pos) / (self.row_bytes + 1);
        frames.min(self.max_rows - self.row)
    }

    fn finish(&mut self) {
        self.pos = self.data.len();
        self.row = self.max_rows;
    }
}

impl Iterator for Scanlines {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.max_rows {
            return None;
        }
        let frame = match self.data.get(self.pos..self.pos + 1 + self.row_bytes) {
            Some(frame) => frame,
            None => {
                if self.pos < self.data.len() {
                    debug!("ignoring {} bytes of incomplete row {}", self.data.len() - self.pos, self.row);
                }
                self.finish();
                return None;
            },
        };
        let row = self.row;
        let tag = frame[0];
        let filter_type = match FilterType::from_u8(tag) {
            Some(f) => f,
            None => {
                self.finish();
                return Some(Err(Error::UnknownFilter { filter_type: tag, row }));
            },
        };
        let mut recon = Vec::new();
        if let Err(e) = recon.try_reserve_exact(self.row_bytes) {
            self.finish();
            return Some(Err(e.into()));
        }
        recon.resize(self.row_bytes, 0);
        unfilter_scanline(&mut recon, &frame[1..], &self.prev, self.filter_unit, filter_type);
        trace!("row {} {:?}", row, filter_type);

        self.prev.copy_from_slice(&recon);
        self.pos += 1 + self.row_bytes;
        self.row += 1;
        Some(Ok(recon))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.rows_remaining()))
    }
}

impl std::iter::FusedIterator for Scanlines {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::Wrapping;

    /// Encoder direction, for round trips
    fn filter_scanline(out: &mut [u8], scanline: &[u8], prevline: &[u8], bytewidth: usize, filter_type: FilterType) {
        let w = |x: u8| Wrapping(x);
        let length = scanline.len();
        let left = |i: usize| if i >= bytewidth { scanline[i - bytewidth] } else { 0 };
        let upleft = |i: usize| if i >= bytewidth { prevline[i - bytewidth] } else { 0 };
        for i in 0..length {
            let pred = match filter_type {
                FilterType::None => 0,
                FilterType::Sub => left(i),
                FilterType::Up => prevline[i],
                FilterType::Average => ((u16::from(left(i)) + u16::from(prevline[i])) / 2) as u8,
                FilterType::Paeth => paeth_predictor(left(i), prevline[i], upleft(i)),
            };
            out[i] = (w(scanline[i]) - w(pred)).0;
        }
    }

    const ALL: [FilterType; 5] = [FilterType::None, FilterType::Sub, FilterType::Up, FilterType::Average, FilterType::Paeth];

    #[test]
    fn test_filter() {
        let mut line1 = Vec::with_capacity(1 << 16);
        let mut line2 = Vec::with_capacity(1 << 16);
        for p in 0..256 {
            for q in 0..256 {
                line1.push(q as u8);
                line2.push(p as u8);
            }
        }
        let zeros = vec![0u8; 1 << 16];

        let mut filtered = vec![99u8; 1 << 16];
        let mut unfiltered = vec![66u8; 1 << 16];
        for bytewidth in [1, 2, 3, 4, 6, 8] {
            for filter_type in ALL {
                filter_scanline(&mut filtered, &line1, &line2, bytewidth, filter_type);
                unfilter_scanline(&mut unfiltered, &filtered, &line2, bytewidth, filter_type);
                assert_eq!(unfiltered, line1, "prev+filter={filter_type:?} bw={bytewidth}");
            }
            for filter_type in ALL {
                filter_scanline(&mut filtered, &line1, &zeros, bytewidth, filter_type);
                unfilter_scanline(&mut unfiltered, &filtered, &zeros, bytewidth, filter_type);
                assert_eq!(unfiltered, line1, "none+filter={filter_type:?} bw={bytewidth}");
            }
        }
    }

    #[test]
    fn rows_of_several_pixel_lengths() {
        let mut seed = 7u32;
        let mut rand = move || {
            seed = 1103515245u32.wrapping_mul(seed).wrapping_add(12345);
            (seed >> 17) as u8
        };
        for bytewidth in [1, 3, 4, 8] {
            for pixels in 1..6 {
                let len = bytewidth * pixels;
                let prev: Vec<u8> = (0..len).map(|_| rand()).collect();
                let line: Vec<u8> = (0..len).map(|_| rand()).collect();
                for filter_type in ALL {
                    let mut filtered = vec![0; len];
                    let mut recon = vec![0; len];
                    filter_scanline(&mut filtered, &line, &prev, bytewidth, filter_type);
                    unfilter_scanline(&mut recon, &filtered, &prev, bytewidth, filter_type);
                    assert_eq!(recon, line, "{filter_type:?} bw={bytewidth} len={len}");
                }
            }
        }
    }

    #[test]
    fn exact_reconstruction_rules() {
        let prior = [10, 20, 30, 40];
        let raw = [1, 2, 3, 250];
        let mut recon = [0; 4];

        unfilter_scanline(&mut recon, &raw, &prior, 1, FilterType::None);
        assert_eq!(recon, [1, 2, 3, 250]);
        unfilter_scanline(&mut recon, &raw, &prior, 1, FilterType::Sub);
        assert_eq!(recon, [1, 3, 6, 0]);
        unfilter_scanline(&mut recon, &raw, &prior, 2, FilterType::Sub);
        assert_eq!(recon, [1, 2, 4, 252]);
        unfilter_scanline(&mut recon, &raw, &prior, 1, FilterType::Up);
        assert_eq!(recon, [11, 22, 33, 34]);
        // 1 + 10/2 = 6; 2 + (6+20)/2 = 15; 3 + (15+30)/2 = 25; 250 + (25+40)/2 = 282 % 256
        unfilter_scanline(&mut recon, &raw, &prior, 1, FilterType::Average);
        assert_eq!(recon, [6, 15, 25, 26]);
        unfilter_scanline(&mut recon[..2], &[0, 0], &[0, 255], 1, FilterType::Average);
        assert_eq!(&recon[..2], &[0, 127]);
        // a + b doesn't fit in a byte
        let mut recon2 = [0; 2];
        unfilter_scanline(&mut recon2, &[200, 0], &[0, 200], 1, FilterType::Average);
        assert_eq!(recon2, [200, 200]);
    }

    #[test]
    fn paeth_tie_break() {
        // a = b = c
        assert_eq!(paeth_predictor(5, 5, 5), 5);
        // pa == pb < pc: a
        assert_eq!(paeth_predictor(9, 9, 0), 9);
        // pa == pc > pb: b
        assert_eq!(paeth_predictor(3, 8, 3), 8);
        // pa == pc < pb: a
        assert_eq!(paeth_predictor(6, 0, 2), 6);
        // pb == pc < pa: b
        assert_eq!(paeth_predictor(0, 6, 2), 6);
        // pa == pb > pc: c
        assert_eq!(paeth_predictor(4, 6, 5), 5);
        assert_eq!(paeth_predictor(10, 0, 5), 5);
        // no ties
        assert_eq!(paeth_predictor(1, 7, 7), 1);
        assert_eq!(paeth_predictor(2, 4, 0), 4);
        assert_eq!(paeth_predictor(4, 2, 0), 4);
        assert_eq!(paeth_predictor(20, 12, 14), 20);
        assert_eq!(paeth_predictor(0, 5, 1), 5);
    }

    fn frames(rows: &[(u8, &[u8])]) -> Vec<u8> {
        rows.iter().flat_map(|(f, r)| std::iter::once(*f).chain(r.iter().copied())).collect()
    }

    #[test]
    fn previous_row_carries_over() {
        let data = frames(&[(0, &[1, 2, 3]), (2, &[1, 1, 1]), (2, &[1, 1, 1])]);
        let rows: Vec<_> = Scanlines::new(data, 3, 1, 3).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![vec![1, 2, 3], vec![2, 3, 4], vec![3, 4, 5]]);
    }

    #[test]
    fn first_row_sees_zeros_above() {
        for f in [2, 3, 4] {
            let data = frames(&[(f, &[5, 6, 7, 8])]);
            let row = Scanlines::new(data, 4, 2, 1).unwrap().next().unwrap().unwrap();
            match f {
                2 => assert_eq!(row, [5, 6, 7, 8]),
                3 => assert_eq!(row, [5, 6, 7 + 5 / 2, 8 + 6 / 2]),
                _ => assert_eq!(row, [5, 6, 12, 14]),
            }
        }
    }

    #[test]
    fn unknown_filter_ends_iteration() {
        let data = frames(&[(1, &[1, 2]), (5, &[1, 2]), (0, &[1, 2])]);
        let mut lines = Scanlines::new(data, 2, 1, 3).unwrap();
        assert!(lines.next().unwrap().is_ok());
        assert!(matches!(lines.next(), Some(Err(Error::UnknownFilter { filter_type: 5, row: 1 }))));
        assert!(lines.next().is_none());
    }

    #[test]
    fn partial_and_extra_frames() {
        let data = frames(&[(0, &[1, 2]), (0, &[3, 4])]);
        let mut short = data.clone();
        short.pop();
        assert_eq!(Scanlines::new(short, 2, 1, 2).unwrap().count(), 1);
        let lines = Scanlines::new(data, 2, 1, 1).unwrap();
        assert_eq!(lines.rows_remaining(), 1);
        assert_eq!(lines.count(), 1);
    }
}
