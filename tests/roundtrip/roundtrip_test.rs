use crate::{ihdr, png, zlib};
use pngread::*;

#[test]
fn roundtrip_grey() {
    roundtrip_color(0, &[8, 16]);
}

#[test]
fn roundtrip_rgb() {
    roundtrip_color(2, &[8, 16]);
}

#[test]
fn roundtrip_rgba() {
    roundtrip_color(6, &[8, 16]);
}

#[test]
fn roundtrip_grey_alpha() {
    roundtrip_color(4, &[8, 16]);
}

#[track_caller]
fn roundtrip_color(color_type: u8, bitdepths: &[u8]) {
    let channels = match color_type {
        0 => 1,
        2 => 3,
        4 => 2,
        _ => 4,
    };
    let mut n = 0;
    let mut data = vec![0; 256 + 64 * 64 * channels * 2];
    for &bitdepth in bitdepths {
        for width in [1, 2, 3, 4, 5, 7, 8, 9, 16, 17, 64] {
            randomize(&mut data);
            for height in [1, 2, 3, 5, 8, 17, 64] {
                for mixed_filters in [false, true] {
                    let (filters, data) = data.split_at(height);
                    let filters: Vec<u8> = if mixed_filters {
                        filters.iter().map(|&f| f % 5).collect()
                    } else {
                        vec![(n % 5) as u8; height]
                    };
                    n += 1;
                    roundtrip_data(data, width, height, color_type, channels, bitdepth, &filters);
                }
            }
        }
    }
}

fn randomize(data: &mut [u8]) {
    let mut seed = u32::from(data[0]);
    for b in data {
        seed = 1103515245u32.wrapping_mul(seed).wrapping_add(12345);
        *b ^= (seed >> 17) as u8;
    }
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let (pa, pb, pc) = ((p - i16::from(a)).abs(), (p - i16::from(b)).abs(), (p - i16::from(c)).abs());
    if pa <= pb && pa <= pc { a } else if pb <= pc { b } else { c }
}

/// Encoder side of the filters, independent of the decoder's implementation
fn filter_row(out: &mut Vec<u8>, row: &[u8], prev: &[u8], bpp: usize, filter: u8) {
    out.push(filter);
    for i in 0..row.len() {
        let a = if i >= bpp { row[i - bpp] } else { 0 };
        let b = prev[i];
        let c = if i >= bpp { prev[i - bpp] } else { 0 };
        let predicted = match filter {
            0 => 0,
            1 => a,
            2 => b,
            3 => ((u16::from(a) + u16::from(b)) / 2) as u8,
            _ => paeth(a, b, c),
        };
        out.push(row[i].wrapping_sub(predicted));
    }
}

#[track_caller]
fn roundtrip_data(data: &[u8], width: usize, height: usize, color_type: u8, channels: usize, bitdepth: u8, filters: &[u8]) {
    let bytes_per_pixel = channels * usize::from(bitdepth) / 8;
    let row_bytes = width * bytes_per_pixel;
    let data = &data[..row_bytes * height];

    let mut scanlines = Vec::new();
    let zeros = vec![0; row_bytes];
    let mut prev = &zeros[..];
    for (row, &filter) in data.chunks_exact(row_bytes).zip(filters) {
        filter_row(&mut scanlines, row, prev, bytes_per_pixel, filter);
        prev = row;
    }
    let header = ihdr(width as u32, height as u32, bitdepth, color_type, 0);
    let file = png(&[(b"IHDR", &header), (b"IDAT", &zlib(&scanlines)), (b"IEND", &[])]);

    let decoded = decode_memory(&file).unwrap();
    assert_eq!(decoded.image.width(), width);
    assert_eq!(decoded.image.height(), height);

    let samples: Vec<u16> = if bitdepth == 16 {
        data.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect()
    } else {
        data.iter().map(|&b| u16::from(b)).collect()
    };
    let expected: Vec<RGBA16> = samples.chunks_exact(channels).map(|px| match *px {
        [v] => RGBA16::new(v, v, v, 0xffff),
        [v, a] => RGBA16::new(v, v, v, a),
        [r, g, b] => RGBA16::new(r, g, b, 0xffff),
        [r, g, b, a] => RGBA16::new(r, g, b, a),
        _ => unreachable!(),
    }).collect();
    assert_eq!(decoded.image.rgba_pixels(0xffff), expected);
}
