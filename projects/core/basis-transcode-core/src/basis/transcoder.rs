use super::constants::*;
use super::header::{read_header, read_slice_desc, section, BasisHeader, SliceDesc};
use super::slice_decoder::{CodebookSections, NoSliceDecoder, SliceDecoder, SliceTranscode};
use crate::codebook::GlobalCodebook;
use crate::engine::{ImageInfo, ImageLevelInfo, TranscodeRequest, TranscoderEngine};
use crate::format::FormatFamily;
use crate::size::ImageLevelDesc;
use likely_stable::unlikely;

/// A [`TranscoderEngine`] that reads `.basis` metadata natively and delegates block decoding
/// to a [`SliceDecoder`].
///
/// Holds the per-handle session state: whether [`TranscoderEngine::start_transcoding`]
/// succeeded, and whatever the decoder keeps.
#[derive(Debug)]
pub struct BasisTranscoder<D: SliceDecoder = NoSliceDecoder> {
    codebook: &'static GlobalCodebook,
    decoder: D,
    ready_to_transcode: bool,
}

impl<D: SliceDecoder> BasisTranscoder<D> {
    /// Creates a session bound to `codebook`.
    pub const fn new(codebook: &'static GlobalCodebook, decoder: D) -> Self {
        Self {
            codebook,
            decoder,
            ready_to_transcode: false,
        }
    }

    /// Creates a session bound to the process-wide codebook.
    #[cfg(feature = "std")]
    pub fn with_global_codebook(decoder: D) -> Self {
        Self::new(crate::codebook::global_codebook(), decoder)
    }

    /// The codebook this session was bound to.
    pub fn codebook(&self) -> &'static GlobalCodebook {
        self.codebook
    }

    /// The slice decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// The slice decoder, mutably.
    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }

    /// Consumes the session, returning the slice decoder.
    pub fn into_decoder(self) -> D {
        self.decoder
    }

    /// Whether a transcoding session is active.
    pub fn is_ready_to_transcode(&self) -> bool {
        self.ready_to_transcode
    }

    /// Reads and validates the header of `data`.
    pub fn header(&self, data: &[u8]) -> Option<BasisHeader> {
        read_header(data).ok()
    }
}

#[cfg(feature = "std")]
impl<D: SliceDecoder + Default> Default for BasisTranscoder<D> {
    fn default() -> Self {
        Self::with_global_codebook(D::default())
    }
}

/// Index of the first slice for (image, level). With alpha slices this is the colour slice.
fn find_first_slice_index(
    data: &[u8],
    header: &BasisHeader,
    image_index: u32,
    level_index: u32,
) -> Option<u32> {
    (0..header.total_slices).find(|&slice_index| {
        read_slice_desc(data, header, slice_index).is_some_and(|desc| {
            desc.image_index == image_index && desc.level_index as u32 == level_index
        })
    })
}

/// Number of levels in `image_index`: one past the highest level index among the slices
/// directly following the image's level 0.
fn total_image_levels(data: &[u8], header: &BasisHeader, image_index: u32) -> Option<u32> {
    let first = find_first_slice_index(data, header, image_index, 0)?;

    let mut total_levels = 1;
    for slice_index in first + 1..header.total_slices {
        let desc = read_slice_desc(data, header, slice_index)?;
        if desc.image_index != image_index {
            break;
        }
        total_levels = total_levels.max(desc.level_index as u32 + 1);
    }

    if total_levels > BASIS_MAX_LEVELS {
        return None;
    }
    Some(total_levels)
}

fn find_level_slice(
    data: &[u8],
    header: &BasisHeader,
    image_index: u32,
    level_index: u32,
) -> Option<(u32, SliceDesc)> {
    let slice_index = find_first_slice_index(data, header, image_index, level_index)?;
    let desc = read_slice_desc(data, header, slice_index)?;
    Some((slice_index, desc))
}

/// Locates a level of an image whose level count is within [`BASIS_MAX_LEVELS`].
fn find_image_level(
    data: &[u8],
    header: &BasisHeader,
    image_index: u32,
    level_index: u32,
) -> Option<(u32, SliceDesc)> {
    if image_index >= header.total_images {
        return None;
    }
    if level_index >= total_image_levels(data, header, image_index)? {
        return None;
    }
    find_level_slice(data, header, image_index, level_index)
}

/// The alpha slice paired with the colour slice at `slice_index`.
fn find_alpha_slice(
    data: &[u8],
    header: &BasisHeader,
    slice_index: u32,
    colour: &SliceDesc,
) -> Option<SliceDesc> {
    let alpha = read_slice_desc(data, header, slice_index + 1)?;
    let paired = alpha.is_alpha()
        && alpha.image_index == colour.image_index
        && alpha.level_index == colour.level_index;
    paired.then_some(alpha)
}

impl<D: SliceDecoder> TranscoderEngine for BasisTranscoder<D> {
    fn validate_header(&self, data: &[u8]) -> bool {
        read_header(data).is_ok()
    }

    fn total_images(&self, data: &[u8]) -> u32 {
        read_header(data).map_or(0, |header| header.total_images)
    }

    fn image_info(&self, data: &[u8], image_index: u32) -> Option<ImageInfo> {
        let header = read_header(data).ok()?;
        if image_index >= header.total_images {
            return None;
        }

        let total_levels = total_image_levels(data, &header, image_index)?;
        let (slice_index, desc) = find_level_slice(data, &header, image_index, 0)?;
        Some(ImageInfo {
            image_index,
            total_levels,
            orig_width: desc.orig_width as u32,
            orig_height: desc.orig_height as u32,
            num_blocks_x: desc.num_blocks_x as u32,
            num_blocks_y: desc.num_blocks_y as u32,
            total_blocks: desc.total_blocks(),
            alpha_flag: header.has_alpha_slices(),
            first_slice_index: slice_index,
        })
    }

    fn image_level_desc(
        &self,
        data: &[u8],
        image_index: u32,
        level_index: u32,
    ) -> Option<ImageLevelDesc> {
        let header = read_header(data).ok()?;
        let (_, desc) = find_image_level(data, &header, image_index, level_index)?;
        Some(ImageLevelDesc::new(
            desc.orig_width as u32,
            desc.orig_height as u32,
            desc.total_blocks(),
        ))
    }

    fn image_level_info(
        &self,
        data: &[u8],
        image_index: u32,
        level_index: u32,
    ) -> Option<ImageLevelInfo> {
        let header = read_header(data).ok()?;
        let (slice_index, desc) = find_image_level(data, &header, image_index, level_index)?;
        Some(ImageLevelInfo {
            image_index,
            level_index,
            orig_width: desc.orig_width as u32,
            orig_height: desc.orig_height as u32,
            width: desc.num_blocks_x as u32 * 4,
            height: desc.num_blocks_y as u32 * 4,
            num_blocks_x: desc.num_blocks_x as u32,
            num_blocks_y: desc.num_blocks_y as u32,
            total_blocks: desc.total_blocks(),
            alpha_flag: header.has_alpha_slices(),
            first_slice_index: slice_index,
        })
    }

    fn start_transcoding(&mut self, data: &[u8]) -> bool {
        self.stop_transcoding();

        let Ok(header) = read_header(data) else {
            return false;
        };
        if header.total_endpoints == 0 || header.total_selectors == 0 {
            return false;
        }

        let Some(sections) = codebook_sections(data, &header) else {
            return false;
        };

        self.ready_to_transcode = self.decoder.start_transcoding(self.codebook, &sections);
        self.ready_to_transcode
    }

    fn stop_transcoding(&mut self) {
        if self.ready_to_transcode {
            self.decoder.stop_transcoding();
        }
        self.ready_to_transcode = false;
    }

    fn transcode_image_level(
        &mut self,
        data: &[u8],
        image_index: u32,
        level_index: u32,
        dst: &mut [u8],
        request: &TranscodeRequest,
    ) -> bool {
        if unlikely(!self.ready_to_transcode) {
            return false;
        }

        let Ok(header) = read_header(data) else {
            return false;
        };
        let Some((slice_index, desc)) = find_image_level(data, &header, image_index, level_index)
        else {
            return false;
        };

        let alpha_desc = if header.has_alpha_slices() {
            match find_alpha_slice(data, &header, slice_index, &desc) {
                Some(alpha) => Some(alpha),
                None => return false,
            }
        } else {
            None
        };

        if !fits_request(&desc, dst.len(), request) {
            return false;
        }

        let Some(slice_data) = desc.data(data) else {
            return false;
        };
        let alpha_data = match alpha_desc {
            Some(alpha) => match alpha.data(data) {
                Some(alpha_data) => Some(alpha_data),
                None => return false,
            },
            None => None,
        };

        let slice = SliceTranscode {
            image_index,
            level_index,
            orig_width: desc.orig_width as u32,
            orig_height: desc.orig_height as u32,
            num_blocks_x: desc.num_blocks_x as u32,
            num_blocks_y: desc.num_blocks_y as u32,
            data: slice_data,
            alpha_data,
        };
        self.decoder
            .transcode_slice(self.codebook, &slice, dst, request)
    }
}

fn codebook_sections<'a>(data: &'a [u8], header: &BasisHeader) -> Option<CodebookSections<'a>> {
    Some(CodebookSections {
        total_endpoints: header.total_endpoints as u32,
        endpoints: section(
            data,
            header.endpoint_cb_file_ofs,
            header.endpoint_cb_file_size,
        )?,
        total_selectors: header.total_selectors as u32,
        selectors: section(
            data,
            header.selector_cb_file_ofs,
            header.selector_cb_file_size,
        )?,
        tables: section(data, header.tables_file_ofs, header.tables_file_size)?,
        extended: section(data, header.extended_file_ofs, header.extended_file_size)?,
    })
}

/// Checks the destination described by `request` can hold the level described by `desc`.
fn fits_request(desc: &SliceDesc, dst_len: usize, request: &TranscodeRequest) -> bool {
    let format = request.format;
    let dst_len = dst_len as u64;

    match format.family() {
        FormatFamily::Uncompressed => {
            let orig_width = desc.orig_width as u32;
            let orig_height = desc.orig_height as u32;
            let pitch = match request.output_row_pitch {
                0 => orig_width,
                pitch => pitch,
            };
            let rows = match request.output_rows {
                0 => orig_height,
                rows => rows,
            };
            if pitch < orig_width || rows < orig_height {
                return false;
            }

            let pixels = pitch as u64 * rows as u64;
            request.output_units as u64 >= pixels
                && dst_len >= pixels * format.bytes_per_pixel() as u64
        }
        FormatFamily::BlockCompressed => {
            if format.is_pvrtc1() {
                let width = desc.num_blocks_x as u32 * 4;
                let height = desc.num_blocks_y as u32 * 4;
                if !width.is_power_of_two() || !height.is_power_of_two() {
                    return false;
                }

                #[cfg(debug_assertions)]
                {
                    let level = ImageLevelDesc::new(
                        desc.orig_width as u32,
                        desc.orig_height as u32,
                        desc.total_blocks(),
                    );
                    debug_assert!(
                        crate::size::transcoded_size_in_bytes(&level, format)
                            >= desc.total_blocks().saturating_mul(format.bytes_per_block())
                    );
                }
            }

            request.output_units >= desc.total_blocks()
                && dst_len >= request.output_units as u64 * format.bytes_per_block() as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_flags::DecodeFlags;
    use crate::format::TranscoderTextureFormat;
    use crate::size::transcoded_size_in_bytes;
    use crate::test_prelude::*;

    fn transcoder() -> BasisTranscoder<RecordingDecoder> {
        BasisTranscoder::with_global_codebook(RecordingDecoder::default())
    }

    fn block_request(format: TranscoderTextureFormat, units: u32) -> TranscodeRequest {
        TranscodeRequest {
            format,
            output_units: units,
            flags: DecodeFlags::NONE,
            output_row_pitch: 0,
            output_rows: 0,
        }
    }

    #[test]
    fn reports_single_image_topology() {
        let file = BasisFixture::new(16, 8).build();
        let engine = transcoder();

        assert!(engine.validate_header(&file));
        assert_eq!(engine.total_images(&file), 1);

        let info = engine.image_info(&file, 0).unwrap();
        assert_eq!(info.total_levels, 1);
        assert_eq!((info.orig_width, info.orig_height), (16, 8));
        assert_eq!(info.total_blocks, 8);
        assert!(!info.alpha_flag);

        assert_eq!(
            engine.image_level_desc(&file, 0, 0),
            Some(ImageLevelDesc::new(16, 8, 8))
        );
        assert_eq!(engine.image_info(&file, 1), None);
        assert_eq!(engine.image_level_desc(&file, 0, 1), None);
    }

    #[test]
    fn reports_mip_chain() {
        let file = BasisFixture::new(30, 17).with_levels(4).build();
        let engine = transcoder();

        assert_eq!(engine.image_info(&file, 0).unwrap().total_levels, 4);

        let expected = [(30, 17), (15, 8), (7, 4), (3, 2)];
        for (level, (width, height)) in expected.into_iter().enumerate() {
            let info = engine.image_level_info(&file, 0, level as u32).unwrap();
            assert_eq!((info.orig_width, info.orig_height), (width, height));
            assert_eq!(info.width, width.div_ceil(4) * 4);
            assert_eq!(info.height, height.div_ceil(4) * 4);
            assert_eq!(info.desc(), engine.image_level_desc(&file, 0, level as u32).unwrap());
        }
    }

    #[test]
    fn reports_multiple_images_with_alpha() {
        let file = BasisFixture::new(8, 8)
            .with_images(3)
            .with_levels(2)
            .with_alpha()
            .build();
        let engine = transcoder();

        assert_eq!(engine.total_images(&file), 3);
        for image in 0..3 {
            let info = engine.image_info(&file, image).unwrap();
            assert_eq!(info.total_levels, 2);
            assert!(info.alpha_flag);
            // colour + alpha per level, two levels per image
            assert_eq!(info.first_slice_index, image * 4);
        }
        assert_eq!(engine.image_info(&file, 3), None);
    }

    #[test]
    fn rejects_too_many_levels() {
        let file = BasisFixture::new(1, 1).with_levels(17).build();
        let mut engine = transcoder();
        assert!(engine.validate_header(&file));
        assert_eq!(engine.image_info(&file, 0), None);
        assert_eq!(engine.image_level_desc(&file, 0, 0), None);
        assert_eq!(engine.image_level_info(&file, 0, 0), None);
        assert_eq!(engine.image_level_desc(&file, 0, 16), None);

        assert!(engine.start_transcoding(&file));
        let mut dst = vec![0u8; 8];
        let request = block_request(TranscoderTextureFormat::Bc1Rgb, 1);
        assert!(!engine.transcode_image_level(&file, 0, 0, &mut dst, &request));
        assert!(engine.decoder().transcodes.is_empty());
    }

    #[test]
    fn accepts_sixteen_levels() {
        let file = BasisFixture::new(1, 1).with_levels(16).build();
        let engine = transcoder();
        assert_eq!(engine.image_info(&file, 0).unwrap().total_levels, 16);
        assert_eq!(
            engine.image_level_desc(&file, 0, 15),
            Some(ImageLevelDesc::new(1, 1, 1))
        );
        assert_eq!(engine.image_level_desc(&file, 0, 16), None);
    }

    #[test]
    fn invalid_buffer_yields_no_metadata() {
        let engine = transcoder();
        let garbage = [0u8; 128];
        assert!(!engine.validate_header(&garbage));
        assert_eq!(engine.total_images(&garbage), 0);
        assert_eq!(engine.image_info(&garbage, 0), None);
        assert_eq!(engine.image_level_info(&garbage, 0, 0), None);
    }

    #[test]
    fn transcode_requires_started_session() {
        let file = BasisFixture::new(16, 8).build();
        let mut engine = transcoder();
        let mut dst = vec![0u8; 64];
        let request = block_request(TranscoderTextureFormat::Bc1Rgb, 8);

        assert!(!engine.transcode_image_level(&file, 0, 0, &mut dst, &request));
        assert!(engine.decoder().transcodes.is_empty());

        assert!(engine.start_transcoding(&file));
        assert!(engine.is_ready_to_transcode());
        assert!(engine.transcode_image_level(&file, 0, 0, &mut dst, &request));
        assert_eq!(engine.decoder().transcodes.len(), 1);
        assert!(dst.iter().all(|&b| b == FILL_BYTE));
    }

    #[test]
    fn start_passes_codebook_sections() {
        let file = BasisFixture::new(16, 8).build();
        let mut engine = transcoder();
        assert!(engine.start_transcoding(&file));

        let started = engine.decoder().started.as_ref().unwrap();
        assert_eq!(started.total_endpoints, FIXTURE_TOTAL_ENDPOINTS as u32);
        assert_eq!(started.total_selectors, FIXTURE_TOTAL_SELECTORS as u32);
        assert_eq!(started.endpoints_len, FIXTURE_SECTION_SIZE);
        assert_eq!(started.selectors_len, FIXTURE_SECTION_SIZE);
        assert_eq!(started.tables_len, FIXTURE_SECTION_SIZE);
    }

    #[test]
    fn stop_resets_session() {
        let file = BasisFixture::new(16, 8).build();
        let mut engine = transcoder();
        assert!(engine.start_transcoding(&file));
        engine.stop_transcoding();
        assert!(!engine.is_ready_to_transcode());
        assert_eq!(engine.decoder().stops, 1);

        let mut dst = vec![0u8; 64];
        let request = block_request(TranscoderTextureFormat::Bc1Rgb, 8);
        assert!(!engine.transcode_image_level(&file, 0, 0, &mut dst, &request));
    }

    #[test]
    fn start_fails_when_decoder_fails() {
        let file = BasisFixture::new(16, 8).build();
        let mut engine = BasisTranscoder::with_global_codebook(RecordingDecoder::failing());
        assert!(!engine.start_transcoding(&file));
        assert!(!engine.is_ready_to_transcode());
    }

    #[test]
    fn start_fails_without_codebooks() {
        let file = BasisFixture::new(16, 8).without_codebooks().build();
        let mut engine = transcoder();
        assert!(!engine.start_transcoding(&file));
        assert!(engine.decoder().started.is_none());
    }

    #[test]
    fn block_transcode_rejects_insufficient_units() {
        let file = BasisFixture::new(16, 8).build();
        let mut engine = transcoder();
        assert!(engine.start_transcoding(&file));

        let mut dst = vec![0u8; 64];
        let request = block_request(TranscoderTextureFormat::Bc1Rgb, 7);
        assert!(!engine.transcode_image_level(&file, 0, 0, &mut dst, &request));

        // Units claim more space than the buffer has.
        let request = block_request(TranscoderTextureFormat::Bc1Rgb, 9);
        assert!(!engine.transcode_image_level(&file, 0, 0, &mut dst, &request));
        assert!(engine.decoder().transcodes.is_empty());
    }

    #[rstest]
    #[case(16, 8, true)]
    #[case(4, 4, true)]
    #[case(12, 8, false)]
    #[case(16, 24, false)]
    fn pvrtc1_requires_power_of_two(
        #[case] width: u32,
        #[case] height: u32,
        #[case] accepted: bool,
    ) {
        let file = BasisFixture::new(width, height).build();
        let mut engine = transcoder();
        assert!(engine.start_transcoding(&file));

        let format = TranscoderTextureFormat::Pvrtc1_4Rgb;
        let desc = engine.image_level_desc(&file, 0, 0).unwrap();
        let size = transcoded_size_in_bytes(&desc, format) as usize;
        let mut dst = vec![0u8; size];
        let request = block_request(format, (size / 8) as u32);
        assert_eq!(
            engine.transcode_image_level(&file, 0, 0, &mut dst, &request),
            accepted
        );
    }

    #[test]
    fn pvrtc1_large_level_fits_its_reported_size() {
        let desc = SliceDesc {
            orig_width: 32768,
            orig_height: 32768,
            num_blocks_x: 8192,
            num_blocks_y: 8192,
            ..SliceDesc::default()
        };
        let format = TranscoderTextureFormat::Pvrtc1_4Rgb;
        let level = ImageLevelDesc::new(32768, 32768, desc.total_blocks());
        let size = transcoded_size_in_bytes(&level, format);

        let request = block_request(format, size / format.bytes_per_block());
        assert!(fits_request(&desc, size as usize, &request));
    }

    #[test]
    fn raster_transcode_checks_pitch_and_rows() {
        let file = BasisFixture::new(16, 8).build();
        let mut engine = transcoder();
        assert!(engine.start_transcoding(&file));

        let format = TranscoderTextureFormat::Rgba32;
        let mut dst = vec![0u8; 16 * 8 * 4];
        let mut request = TranscodeRequest {
            format,
            output_units: 16 * 8,
            flags: DecodeFlags::NONE,
            output_row_pitch: 16,
            output_rows: 8,
        };
        assert!(engine.transcode_image_level(&file, 0, 0, &mut dst, &request));

        request.output_row_pitch = 15;
        assert!(!engine.transcode_image_level(&file, 0, 0, &mut dst, &request));

        request.output_row_pitch = 16;
        request.output_rows = 7;
        assert!(!engine.transcode_image_level(&file, 0, 0, &mut dst, &request));

        request.output_rows = 8;
        assert!(!engine.transcode_image_level(&file, 0, 0, &mut dst[..100], &request));
    }

    #[test]
    fn alpha_slice_is_forwarded() {
        let file = BasisFixture::new(8, 8).with_alpha().build();
        let mut engine = transcoder();
        assert!(engine.start_transcoding(&file));

        let mut dst = vec![0u8; 4 * 16];
        let request = TranscodeRequest {
            flags: DecodeFlags::TRANSCODE_ALPHA_DATA_TO_OPAQUE_FORMATS,
            ..block_request(TranscoderTextureFormat::Bc3Rgba, 4)
        };
        assert!(engine.transcode_image_level(&file, 0, 0, &mut dst, &request));

        let recorded = &engine.decoder().transcodes[0];
        assert!(recorded.has_alpha_data);
        assert_eq!(recorded.request, request);
        assert_eq!((recorded.image_index, recorded.level_index), (0, 0));
    }

    #[test]
    fn no_slice_decoder_starts_but_never_transcodes() {
        let file = BasisFixture::new(16, 8).build();
        let mut engine: BasisTranscoder = BasisTranscoder::default();
        assert!(engine.start_transcoding(&file));

        let mut dst = vec![0u8; 64];
        let request = block_request(TranscoderTextureFormat::Bc1Rgb, 8);
        assert!(!engine.transcode_image_level(&file, 0, 0, &mut dst, &request));
    }
}
