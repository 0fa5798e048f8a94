#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let decoder = if let Ok(d) = tiff_ifd::Decoder::new(std::io::Cursor::new(data)) {
        d
    } else {
        return;
    };

    let mut limits = tiff_ifd::Limits::default();
    limits.ifd_value_size = 1_000_000;
    limits.raster_size = 1_000_000;
    limits.max_directories = 64;

    let mut decoder = decoder.with_limits(limits);
    let Ok(mut pages) = decoder.read_all() else {
        return;
    };

    let mut reader = decoder.into_inner();
    for page in &mut pages {
        if page.load_raster_from(&mut reader).is_err() {
            return;
        }
        let _ = page.geo_keys();
        let _ = tiff_ifd::encoder::encode(page, Default::default());
    }
});
