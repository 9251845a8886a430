use pngread::{Decoder, Image};
use std::path::Path;
use std::process::ExitCode;

/// `read <file.png> [0|1|2]`
///
/// 0 prints the header, 1 describes it in words, 2 also prints every pixel.
fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: read <file.png> [0|1|2]");
        return ExitCode::FAILURE;
    };
    let mode: u8 = args.next().and_then(|m| m.parse().ok()).unwrap_or(0);
    let path = Path::new(&path);

    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Could not load {}, because: {}", path.display(), err);
            return ExitCode::FAILURE;
        },
    };

    let decoder = Decoder::new();
    let result = if mode < 2 {
        decoder.inspect(&data).map(|info| (info, None))
    } else {
        decoder.decode(&data).map(|png| (png.info, Some(png.image)))
    };
    let (info, image) = match result {
        Ok(res) => res,
        Err(err) => {
            eprintln!("Could not decode {}, because: {}", path.display(), err);
            return ExitCode::FAILURE;
        },
    };

    let fields = if mode == 0 { info.header.info() } else { info.header.detailed_info() };
    for (name, value) in fields {
        println!("{name}: {value}");
    }
    println!("Chunks: {} ({} IDAT)", info.chunk_count, info.idat_count);
    if let Some(palette) = &info.palette {
        println!("Palette: {} colors", palette.len());
    }

    if let Some(image) = image {
        println!("Decoded {} of {} rows", image.height(), info.header.height());
        match &image {
            Image::RGB(bitmap) => {
                for px in &bitmap.buffer {
                    println!("{} {} {}", px.r, px.g, px.b);
                }
            },
            Image::RGBA(bitmap) => {
                for px in &bitmap.buffer {
                    println!("{} {} {} {}", px.r, px.g, px.b, px.a);
                }
            },
        }
    }
    ExitCode::SUCCESS
}
