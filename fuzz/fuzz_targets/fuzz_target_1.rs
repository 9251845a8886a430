#![no_main]
#[macro_use] extern crate libfuzzer_sys;

fuzz_target!(|data: &[u8]| {
    let decoder = pngread::Decoder::new();
    if let Ok(reader) = decoder.reader(data) {
        let height = reader.info().header.height() as usize;
        assert!(reader.count() <= height);
    }
    let _ = decoder.inspect(data);
});
