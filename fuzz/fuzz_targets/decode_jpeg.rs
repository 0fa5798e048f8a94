#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(jpeg) = tiff_ifd::JpegFile::from_reader(data) {
        let _ = jpeg.write_to(std::io::sink());
    }
});
