#![no_main]

// Checks the transcoded size resolver against its closed form for arbitrary dimensions.

use basis_transcode_core::{transcoded_size_in_bytes_raw, ImageLevelDesc, TranscoderTextureFormat};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u16, u16, u32)| {
    let (width, height, format) = input;
    let desc = ImageLevelDesc::from_dimensions(width as u32, height as u32);
    let size = transcoded_size_in_bytes_raw(&desc, format) as u64;

    let Some(format) = TranscoderTextureFormat::from_raw(format) else {
        assert_eq!(size, 0);
        return;
    };

    // Sizes saturate at u32::MAX.
    let clamp = |value: u64| value.min(u32::MAX as u64);
    let pixels = width as u64 * height as u64;
    let blocks = desc.total_blocks as u64;
    if format.is_uncompressed() {
        assert_eq!(size, clamp(pixels * format.bytes_per_pixel() as u64));
    } else if format.is_pvrtc1() {
        let padded_w = ((width as u64 + 3) & !3).max(8);
        let padded_h = ((height as u64 + 3) & !3).max(8);
        assert_eq!(size, clamp((padded_w * padded_h * 4 + 7) / 8));
        assert!(size >= clamp(blocks * format.bytes_per_block() as u64));
    } else {
        assert_eq!(size, clamp(blocks * format.bytes_per_block() as u64));
    }
});
