use crate::format::{FormatFamily, TranscoderTextureFormat};

/// Pre-decode description of a single (image, level) pair.
///
/// Always derived from the container on demand, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageLevelDesc {
    /// Width of the level in pixels, before block alignment.
    pub orig_width: u32,
    /// Height of the level in pixels, before block alignment.
    pub orig_height: u32,
    /// Number of 4x4 blocks in the level.
    pub total_blocks: u32,
}

impl ImageLevelDesc {
    /// Creates a level description.
    pub const fn new(orig_width: u32, orig_height: u32, total_blocks: u32) -> Self {
        Self {
            orig_width,
            orig_height,
            total_blocks,
        }
    }

    /// Creates a level description whose block count is derived from the 4x4 block grid
    /// covering `orig_width` x `orig_height`.
    pub const fn from_dimensions(orig_width: u32, orig_height: u32) -> Self {
        let blocks_x = orig_width.div_ceil(4);
        let blocks_y = orig_height.div_ceil(4);
        Self::new(orig_width, orig_height, blocks_x.saturating_mul(blocks_y))
    }
}

/// Size of a PVRTC1 4bpp level.
///
/// PVRTC1 textures smaller than 8x8 are padded up to 8 pixels in each dimension,
/// after rounding the dimensions up to a multiple of 4.
///
/// ```
/// use basis_transcode_core::pvrtc1_padded_size_in_bytes;
/// assert_eq!(pvrtc1_padded_size_in_bytes(4, 4), 32);
/// assert_eq!(pvrtc1_padded_size_in_bytes(16, 8), 64);
/// ```
pub const fn pvrtc1_padded_size_in_bytes(orig_width: u32, orig_height: u32) -> u32 {
    let width = round_up_to_4(orig_width);
    let height = round_up_to_4(orig_height);
    let width = if width < 8 { 8 } else { width };
    let height = if height < 8 { 8 } else { height };

    // 4bpp over dimensions that are multiples of 4, so (w * h * 4 + 7) / 8 == w * h / 2.
    // Widened so only the final size saturates.
    let bytes = width as u64 * height as u64 / 2;
    if bytes > u32::MAX as u64 {
        u32::MAX
    } else {
        bytes as u32
    }
}

/// Number of bytes a level occupies once transcoded to `format`.
///
/// - Uncompressed formats: `width * height * bytes_per_pixel`.
/// - PVRTC1 formats: [`pvrtc1_padded_size_in_bytes`].
/// - Other block formats: `total_blocks * bytes_per_block`.
///
/// Arithmetic saturates at [`u32::MAX`] instead of wrapping.
pub const fn transcoded_size_in_bytes(
    desc: &ImageLevelDesc,
    format: TranscoderTextureFormat,
) -> u32 {
    match format.family() {
        FormatFamily::Uncompressed => desc
            .orig_width
            .saturating_mul(desc.orig_height)
            .saturating_mul(format.bytes_per_pixel()),
        FormatFamily::BlockCompressed => {
            if format.is_pvrtc1() {
                pvrtc1_padded_size_in_bytes(desc.orig_width, desc.orig_height)
            } else {
                desc.total_blocks.saturating_mul(format.bytes_per_block())
            }
        }
    }
}

/// Same as [`transcoded_size_in_bytes`], but accepts a raw format value.
///
/// Returns 0 if `format` is not a valid [`TranscoderTextureFormat`].
pub const fn transcoded_size_in_bytes_raw(desc: &ImageLevelDesc, format: u32) -> u32 {
    match TranscoderTextureFormat::from_raw(format) {
        Some(format) => transcoded_size_in_bytes(desc, format),
        None => 0,
    }
}

#[inline(always)]
const fn round_up_to_4(value: u32) -> u32 {
    value.saturating_add(3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TOTAL_TEXTURE_FORMATS;
    use crate::test_prelude::*;

    #[rstest]
    #[case(16, 8, 512)]
    #[case(1, 1, 4)]
    #[case(3, 5, 60)]
    #[case(0, 0, 0)]
    fn rgba32_is_width_times_height_times_four(
        #[case] width: u32,
        #[case] height: u32,
        #[case] expected: u32,
    ) {
        let desc = ImageLevelDesc::from_dimensions(width, height);
        assert_eq!(
            transcoded_size_in_bytes(&desc, TranscoderTextureFormat::Rgba32),
            expected
        );
    }

    #[test]
    fn raster_formats_use_original_dimensions() {
        // Block count deliberately inconsistent with dims; raster sizing must ignore it.
        let desc = ImageLevelDesc::new(13, 7, 999);
        for &format in TranscoderTextureFormat::all_values() {
            if format.is_uncompressed() {
                assert_eq!(
                    transcoded_size_in_bytes(&desc, format),
                    13 * 7 * format.bytes_per_pixel(),
                    "{format:?}"
                );
            }
        }
    }

    #[rstest]
    #[case(4, 4)]
    #[case(8, 8)]
    #[case(16, 8)]
    #[case(1, 1)]
    #[case(5, 3)]
    #[case(31, 2)]
    #[case(64, 64)]
    #[case(128, 32)]
    fn pvrtc1_matches_padded_formula(#[case] width: u32, #[case] height: u32) {
        let desc = ImageLevelDesc::from_dimensions(width, height);
        let w = core::cmp::max(8, (width + 3) & !3);
        let h = core::cmp::max(8, (height + 3) & !3);
        let expected = (w * h * 4 + 7) / 8;

        for format in [
            TranscoderTextureFormat::Pvrtc1_4Rgb,
            TranscoderTextureFormat::Pvrtc1_4Rgba,
        ] {
            let size = transcoded_size_in_bytes(&desc, format);
            assert_eq!(size, expected);
            assert!(size >= desc.total_blocks * format.bytes_per_block());
        }
    }

    #[test]
    fn pvrtc1_small_textures_are_padded_to_8x8() {
        // 8x8 pixels at 4bpp is 32 bytes, a single 4x4 block would be 8 bytes.
        let desc = ImageLevelDesc::from_dimensions(4, 4);
        assert_eq!(desc.total_blocks, 1);
        assert_eq!(
            transcoded_size_in_bytes(&desc, TranscoderTextureFormat::Pvrtc1_4Rgb),
            32
        );
        assert_eq!(pvrtc1_padded_size_in_bytes(2, 2), 32);
    }

    #[rstest]
    #[case(TranscoderTextureFormat::Etc1Rgb, 256)]
    #[case(TranscoderTextureFormat::Bc1Rgb, 256)]
    #[case(TranscoderTextureFormat::Bc3Rgba, 512)]
    #[case(TranscoderTextureFormat::Bc7M5Rgba, 512)]
    #[case(TranscoderTextureFormat::Astc4x4Rgba, 512)]
    #[case(TranscoderTextureFormat::Pvrtc2_4Rgba, 256)]
    #[case(TranscoderTextureFormat::Fxt1Rgb, 512)]
    #[case(TranscoderTextureFormat::Etc2EacR11, 256)]
    #[case(TranscoderTextureFormat::Etc2EacRg11, 512)]
    fn block_formats_are_blocks_times_bytes_per_block(
        #[case] format: TranscoderTextureFormat,
        #[case] expected: u32,
    ) {
        // 16x32 => 4x8 = 32 blocks
        let desc = ImageLevelDesc::from_dimensions(16, 32);
        assert_eq!(desc.total_blocks, 32);
        assert_eq!(transcoded_size_in_bytes(&desc, format), expected);
    }

    #[test]
    fn size_is_deterministic() {
        let desc = ImageLevelDesc::from_dimensions(37, 19);
        for &format in TranscoderTextureFormat::all_values() {
            let first = transcoded_size_in_bytes(&desc, format);
            let second = transcoded_size_in_bytes(&desc, format);
            assert_eq!(first, second);
        }
    }

    #[rstest]
    #[case(TOTAL_TEXTURE_FORMATS)]
    #[case(100)]
    #[case(u32::MAX)]
    fn raw_invalid_format_is_zero(#[case] format: u32) {
        let desc = ImageLevelDesc::from_dimensions(16, 16);
        assert_eq!(transcoded_size_in_bytes_raw(&desc, format), 0);
    }

    #[test]
    fn raw_valid_format_matches_typed() {
        let desc = ImageLevelDesc::from_dimensions(16, 16);
        for &format in TranscoderTextureFormat::all_values() {
            assert_eq!(
                transcoded_size_in_bytes_raw(&desc, format as u32),
                transcoded_size_in_bytes(&desc, format)
            );
        }
    }

    #[rstest]
    #[case(32768, 32768)]
    #[case(65535, 16384)]
    #[case(65535, 65535)]
    fn pvrtc1_large_levels_cover_every_block(#[case] width: u32, #[case] height: u32) {
        let desc = ImageLevelDesc::from_dimensions(width, height);
        let exact = (width.div_ceil(4) as u64 * 4) * (height.div_ceil(4) as u64 * 4) / 2;
        let size = transcoded_size_in_bytes(&desc, TranscoderTextureFormat::Pvrtc1_4Rgb);

        assert_eq!(size as u64, exact.min(u32::MAX as u64));
        assert!(size as u64 >= (desc.total_blocks as u64 * 8).min(u32::MAX as u64));
    }

    #[test]
    fn pvrtc1_32768_square_is_exact() {
        let desc = ImageLevelDesc::from_dimensions(32768, 32768);
        assert_eq!(desc.total_blocks, 8192 * 8192);
        assert_eq!(pvrtc1_padded_size_in_bytes(32768, 32768), 536_870_912);
        assert_eq!(
            transcoded_size_in_bytes(&desc, TranscoderTextureFormat::Pvrtc1_4Rgba),
            desc.total_blocks * 8
        );
    }

    #[test]
    fn oversized_dimensions_saturate() {
        let desc = ImageLevelDesc::new(u32::MAX, u32::MAX, u32::MAX);
        assert_eq!(
            transcoded_size_in_bytes(&desc, TranscoderTextureFormat::Rgba32),
            u32::MAX
        );
        assert_eq!(
            transcoded_size_in_bytes(&desc, TranscoderTextureFormat::Bc7M5Rgba),
            u32::MAX
        );
        assert_eq!(
            transcoded_size_in_bytes(&desc, TranscoderTextureFormat::Pvrtc1_4Rgb),
            u32::MAX
        );
    }
}
